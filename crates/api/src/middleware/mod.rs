pub mod jwt;
pub mod security_headers;
