use rand::Rng;

/// Length in bytes of a token signing key (HS256)
pub const SIGNING_KEY_LEN: usize = 32;

/// Generate a secure random signing key
pub fn generate_signing_key() -> [u8; SIGNING_KEY_LEN] {
    let mut rng = rand::thread_rng();
    rng.gen()
}

/// Generate a random secret (32 bytes, hex encoded = 64 characters)
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
