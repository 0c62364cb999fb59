use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// Reset tokens are valid for ten minutes from generation.
pub const RESET_TOKEN_TTL: Duration = Duration::minutes(10);

const TOKEN_BYTES: usize = 32;

/// Freshly generated password-reset token. The hex plaintext goes out by
/// email and is never persisted; only `hash` and `expires_at` are stored
/// on the user row. Generating a new one overwrites any outstanding one.
pub struct ResetToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: OffsetDateTime,
}

impl ResetToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = hex_encode(&bytes);
        let hash = hash_token(&plaintext);
        Self {
            plaintext,
            hash,
            expires_at: OffsetDateTime::now_utc() + RESET_TOKEN_TTL,
        }
    }
}

/// Deterministic one-way hash of the plaintext token, matched against the
/// stored column at exchange time. A fast hash is enough: the token is
/// high-entropy and single-use.
pub fn hash_token(plaintext: &str) -> String {
    hex_encode(&Sha256::digest(plaintext.as_bytes()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
