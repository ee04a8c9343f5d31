//! Access token signing and validation, refresh token generation.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod issuer;
pub mod refresh;

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
pub use issuer::{JwtTokenIssuer, TokenIssuer, TokenValidation};
pub use refresh::generate_refresh_token;
