pub mod generator;
pub mod session;

pub use generator::{generate_secret, generate_signing_key};
pub use session::{Claims, Identity, IssuedToken, TokenCheck, TokenError, TokenService};
