//! Fernet tokens: authenticated, timestamped ciphertext for a single entry.
//!
//! Layout before base64: `0x80 || timestamp (u64 BE) || iv (16) || ciphertext || hmac (32)`.
//! The HMAC-SHA256 tag covers every byte before it. Tokens are URL-safe
//! base64 with padding, interchangeable with other Fernet implementations.

use aes::Aes128;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::key::{JournalKey, KEY_SIZE};

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const VERSION: u8 = 0x80;
pub const IV_SIZE: usize = 16;
const TAG_SIZE: usize = 32;
const HEADER_SIZE: usize = 1 + 8 + IV_SIZE;
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Encrypt an entry into a token with a fresh random IV and the current time.
pub fn encrypt(plaintext: &str, key: &JournalKey) -> CryptoResult<String> {
    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);
    encrypt_at(plaintext.as_bytes(), key, &iv, Utc::now())
}

fn encrypt_at(
    plaintext: &[u8],
    key: &JournalKey,
    iv: &[u8; IV_SIZE],
    now: DateTime<Utc>,
) -> CryptoResult<String> {
    let cipher = Aes128CbcEnc::new_from_slices(key.encryption_key(), iv).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: KEY_SIZE / 2,
            got: key.encryption_key().len(),
        }
    })?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let timestamp = u64::try_from(now.timestamp()).unwrap_or(0);
    let mut data = Vec::with_capacity(HEADER_SIZE + ciphertext.len() + TAG_SIZE);
    data.push(VERSION);
    data.extend_from_slice(&timestamp.to_be_bytes());
    data.extend_from_slice(iv);
    data.extend_from_slice(&ciphertext);

    let tag = sign(&data, key)?;
    data.extend_from_slice(&tag);

    Ok(URL_SAFE.encode(&data))
}

/// Decrypt a token back into the entry text.
///
/// Any verification failure is reported as [`CryptoError::InvalidToken`];
/// a wrong passphrase cannot be told apart from a corrupted token.
pub fn decrypt(token: &str, key: &JournalKey) -> CryptoResult<String> {
    let data = verify(token, key)?;
    let plaintext = decrypt_verified(&data, key)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Decrypt a token, also rejecting tokens older than `ttl` relative to `now`
/// or stamped too far in the future.
pub fn decrypt_with_ttl(
    token: &str,
    key: &JournalKey,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> CryptoResult<String> {
    let data = verify(token, key)?;
    let issued = timestamp_of(&data)?;
    // An out-of-range deadline is never reached.
    let expired = issued
        .checked_add_signed(ttl)
        .is_some_and(|deadline| deadline < now);
    let from_future = now
        .checked_add_signed(TimeDelta::seconds(MAX_CLOCK_SKEW_SECS))
        .is_some_and(|limit| limit < issued);
    if expired || from_future {
        return Err(CryptoError::InvalidToken);
    }
    let plaintext = decrypt_verified(&data, key)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Creation time of a token, after verifying its signature.
pub fn extract_timestamp(token: &str, key: &JournalKey) -> CryptoResult<DateTime<Utc>> {
    let data = verify(token, key)?;
    timestamp_of(&data)
}

fn sign(data: &[u8], key: &JournalKey) -> CryptoResult<[u8; TAG_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(key.signing_key()).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: KEY_SIZE / 2,
            got: key.signing_key().len(),
        }
    })?;
    mac.update(data);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Decode and authenticate a token, returning the signed bytes.
fn verify(token: &str, key: &JournalKey) -> CryptoResult<Vec<u8>> {
    let mut data = URL_SAFE
        .decode(token.as_bytes())
        .map_err(|_| CryptoError::InvalidToken)?;
    if data.len() < HEADER_SIZE + TAG_SIZE || data[0] != VERSION {
        return Err(CryptoError::InvalidToken);
    }

    let signed_len = data.len() - TAG_SIZE;
    let mut mac = HmacSha256::new_from_slice(key.signing_key())
        .map_err(|_| CryptoError::InvalidToken)?;
    mac.update(&data[..signed_len]);
    mac.verify_slice(&data[signed_len..])
        .map_err(|_| CryptoError::InvalidToken)?;

    data.truncate(signed_len);
    Ok(data)
}

fn decrypt_verified(data: &[u8], key: &JournalKey) -> CryptoResult<Vec<u8>> {
    let iv = &data[9..HEADER_SIZE];
    let ciphertext = &data[HEADER_SIZE..];
    let cipher = Aes128CbcDec::new_from_slices(key.encryption_key(), iv)
        .map_err(|_| CryptoError::InvalidToken)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidToken)
}

fn timestamp_of(data: &[u8]) -> CryptoResult<DateTime<Utc>> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[1..9]);
    let secs = i64::try_from(u64::from_be_bytes(raw)).map_err(|_| CryptoError::InvalidToken)?;
    DateTime::from_timestamp(secs, 0).ok_or(CryptoError::InvalidToken)
}
