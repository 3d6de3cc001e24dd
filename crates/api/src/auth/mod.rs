pub mod config;
pub mod cookie;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod tokens;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use password::{PasswordError, PasswordService};
