use strum::{Display, EnumString};

#[derive(EnumString, Debug, PartialEq, Eq, Hash, Clone, Copy, Display)]
pub enum Encoding {
    #[strum(serialize = "gzip")]
    Gzip,
}

pub fn negotiate(accept_encoding: &str) -> Option<Encoding> {
    accept_encoding
        .split(',')
        .find_map(|token| token.trim().parse::<Encoding>().ok())
}
