use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters. Written into every state file header, so files
/// saved with different costs stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            memory_cost: 65_536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// 19 MiB, 2 passes, 1 lane. For constrained clients.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }

    /// Reject costs a crafted header could use to exhaust memory or CPU.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(8..=1_048_576).contains(&self.memory_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF memory_cost out of safe range: {} KiB (expected 8..1048576)",
                self.memory_cost
            )));
        }
        if !(1..=20).contains(&self.time_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF time_cost out of safe range: {} (expected 1..20)",
                self.time_cost
            )));
        }
        if !(1..=16).contains(&self.parallelism) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF parallelism out of safe range: {} (expected 1..16)",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Ciphertext plus everything except the password needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// AES-GCM output, 16-byte tag included
    pub ciphertext: Vec<u8>,
}

/// Argon2id(password, salt) → 256-bit key.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

fn cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm, CoreError> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))
}

fn random_bytes<const N: usize>(what: &str) -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random {what}: {e}")))?;
    Ok(buf)
}

/// Encrypt `plaintext` under `password` with a fresh salt and nonce.
pub fn seal(plaintext: &[u8], password: &str, kdf_params: KdfParams) -> Result<SealedBox, CoreError> {
    kdf_params.validate()?;
    let salt = random_bytes::<SALT_LEN>("salt")?;
    let nonce = random_bytes::<NONCE_LEN>("nonce")?;
    let key = derive_key(password, &salt, &kdf_params)?;

    let ciphertext = cipher(&key)?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

    Ok(SealedBox {
        kdf_params,
        salt,
        nonce,
        ciphertext,
    })
}

/// Decrypt a [`SealedBox`]. A wrong password and tampered bytes both end
/// in [`CoreError::Decryption`]; the tag check cannot tell them apart.
pub fn open(sealed: &SealedBox, password: &str) -> Result<Vec<u8>, CoreError> {
    sealed.kdf_params.validate()?;
    let key = derive_key(password, &sealed.salt, &sealed.kdf_params)?;
    cipher(&key)?
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| CoreError::Decryption)
}
