use crate::errors::CoreError;

use super::encryption::{KdfParams, SealedBox, NONCE_LEN, SALT_LEN};

/// Magic bytes at the start of every state file.
pub const MAGIC: &[u8; 4] = b"CRAI";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + len(8)
pub const HEADER_SIZE: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Serialize a sealed state into the on-disk layout:
///
/// ```text
/// [CRAI: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
pub fn encode(sealed: &SealedBox) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + sealed.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&sealed.salt);
    buf.extend_from_slice(&sealed.nonce);
    buf.extend_from_slice(&(sealed.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&sealed.ciphertext);
    buf
}

/// Forward-only cursor over the header bytes.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self, field: &str) -> Result<[u8; N], CoreError> {
        let end = self.offset + N;
        let bytes: [u8; N] = self
            .data
            .get(self.offset..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat(format!("Failed to read {field}")))?;
        self.offset = end;
        Ok(bytes)
    }

    fn u32(&mut self, field: &str) -> Result<u32, CoreError> {
        self.take::<4>(field).map(u32::from_le_bytes)
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

/// Parse a state file back into its sealed parts.
///
/// Checks magic, version, KDF bounds and length; trailing bytes after the
/// declared ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<SealedBox, CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a state file".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes: not a state file".into(),
        ));
    }

    let mut reader = Reader { data, offset: 4 };
    let version = u16::from_le_bytes(reader.take::<2>("version")?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: reader.u32("KDF memory_cost")?,
        time_cost: reader.u32("KDF time_cost")?,
        parallelism: reader.u32("KDF parallelism")?,
    };
    kdf_params.validate()?;

    let salt = reader.take::<SALT_LEN>("salt")?;
    let nonce = reader.take::<NONCE_LEN>("nonce")?;
    let declared = u64::from_le_bytes(reader.take::<8>("ciphertext length")?);

    let rest = reader.rest();
    let len = usize::try_from(declared)
        .ok()
        .filter(|&len| len <= rest.len())
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "File truncated: expected {declared} bytes of ciphertext, got {}",
                rest.len()
            ))
        })?;

    Ok(SealedBox {
        kdf_params,
        salt,
        nonce,
        ciphertext: rest[..len].to_vec(),
    })
}
