//! Opaque refresh token generation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a refresh token: 32 bytes from the thread-local CSPRNG, base64.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
