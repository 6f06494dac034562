use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

pub const KEY_SIZE: usize = 32;

/// Salt shared by every journal file. Changing it breaks existing journals.
pub const LEGACY_SALT: &[u8] = b"abcd";
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// Key material for one open journal, derived from the passphrase.
///
/// The first half signs tokens (HMAC-SHA256), the second half encrypts
/// them (AES-128-CBC), matching the Fernet key layout.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct JournalKey {
    bytes: [u8; KEY_SIZE],
}

impl JournalKey {
    /// Derive a key from a passphrase via PBKDF2-HMAC-SHA256.
    pub fn derive(passphrase: &[u8]) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, LEGACY_SALT, PBKDF2_ITERATIONS, &mut bytes);
        Self { bytes }
    }

    /// Parse a URL-safe base64 Fernet key.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let decoded = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Base64(e.to_string()))?;
        if decoded.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                got: decoded.len(),
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// The key in the URL-safe base64 form other Fernet implementations accept.
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.bytes[..KEY_SIZE / 2]
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.bytes[KEY_SIZE / 2..]
    }
}

impl std::fmt::Debug for JournalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
