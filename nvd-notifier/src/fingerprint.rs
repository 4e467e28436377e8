use crate::types::{CveItem, NotifierError, Result};
use sha2::{Digest, Sha256};

/// Upper-case hex SHA-256, the same form the NVD `.meta` files advertise.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode_upper(hasher.finalize())
}

impl CveItem {
    /// Content hash of the entry's canonical JSON form.
    ///
    /// This is the only identity used for deduplication and for the
    /// notification store key.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self).map_err(|source| NotifierError::Fingerprint {
            id: self.id().to_string(),
            source,
        })?;
        Ok(sha256_hex(&bytes))
    }
}
