use rand::RngCore;
use rand::rngs::OsRng;

/// Random bytes behind every session token and API key.
pub const TOKEN_BYTES: usize = 32;

/// Hex-encoded token drawn from the OS CSPRNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
