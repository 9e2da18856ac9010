//! Bearer tokens and the request gates built on them.

mod gate;
mod jwt;

pub use gate::{AdminUser, AuthUser};
pub use jwt::{TokenError, TokenService};
