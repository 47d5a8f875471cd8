use crate::http::headers::Headers;
use crate::http::method::Method;
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Request {
    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.headers.get(k)
    }

    pub fn wants_close(&self) -> bool {
        self.get_header("Connection") == Some("close")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.body.len() + self.headers.len() * 32);
        bytes.extend(format!("{} {} {}\r\n", self.method, self.path, self.version).as_bytes());
        for (key, value) in self.headers.iter() {
            bytes.extend(format!("{}: {}\r\n", key, value).as_bytes());
        }
        bytes.extend(b"\r\n");
        bytes.extend(&self.body);
        bytes
    }
}

#[derive(Debug)]
pub struct RequestContext<'a> {
    request: &'a Request,
    url_vars: HashMap<String, String>,
}

impl<'a> RequestContext<'a> {
    pub fn from(request: &'a Request, url_vars: HashMap<String, String>) -> RequestContext<'a> {
        RequestContext { request, url_vars }
    }

    pub fn get_var(&self, k: &str) -> Option<&str> {
        self.url_vars.get(k).map(|v| v.as_str())
    }

    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.request.get_header(k)
    }

    pub fn request(&self) -> &Request {
        self.request
    }
}
