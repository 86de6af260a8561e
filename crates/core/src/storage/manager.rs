use std::path::Path;

use crate::errors::CoreError;
use crate::models::state::AppState;

use super::encryption::{self, KdfParams};
use super::format;

/// Save/load the client state as a password-encrypted, portable blob.
///
/// Flow: AppState → bincode → AES-256-GCM(Argon2id(password)) → CRAI bytes
pub struct StorageManager;

impl StorageManager {
    pub fn save_to_bytes(state: &AppState, password: &str) -> Result<Vec<u8>, CoreError> {
        Self::save_with_params(state, password, KdfParams::default())
    }

    /// Same as [`StorageManager::save_to_bytes`] with explicit KDF costs.
    pub fn save_with_params(
        state: &AppState,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        if password.is_empty() {
            return Err(CoreError::ValidationError("Password must not be empty".into()));
        }
        let plaintext = bincode::serialize(state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize state: {e}")))?;
        let sealed = encryption::seal(&plaintext, password, kdf_params)?;
        tracing::debug!(bytes = sealed.ciphertext.len(), "state sealed");
        Ok(format::encode(&sealed))
    }

    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<AppState, CoreError> {
        let sealed = format::decode(data)?;
        let plaintext = encryption::open(&sealed, password)?;
        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize state: {e}")))
    }

    pub fn save_to_file(
        state: &AppState,
        path: impl AsRef<Path>,
        password: &str,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(state, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>, password: &str) -> Result<AppState, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
