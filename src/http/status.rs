use strum::{FromRepr, IntoStaticStr};

#[derive(FromRepr, IntoStaticStr, Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum Status {
    #[strum(serialize = "OK")]
    Ok = 200,
    #[strum(serialize = "Created")]
    Created = 201,
    #[strum(serialize = "Not Found")]
    NotFound = 404,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        self.into()
    }
}
