use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::{
    aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN},
    digest::{digest, SHA256},
    rand::{SecureRandom, SystemRandom},
};
use std::collections::BTreeMap;

use super::env;

/// AES-256-GCM sealing for platform credentials stored at rest.
///
/// Output is `base64url(nonce || ciphertext || tag)`.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; 32],
}

impl CredentialCipher {
    /// The 32-byte key is the SHA-256 of `secret`.
    pub fn new(secret: &str) -> Self {
        let hash = digest(&SHA256, secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(hash.as_ref());
        Self { key }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&env::required("CREDENTIALS_KEY")?))
    }

    fn sealing_key(&self) -> Result<LessSafeKey> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| anyhow!("Failed to create encryption key"))?;
        Ok(LessSafeKey::new(unbound))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self.sealing_key()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce_bytes)
            .map_err(|_| anyhow!("Failed to generate nonce"))?;

        let mut sealed = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut sealed,
        )
        .map_err(|_| anyhow!("Encryption failed"))?;

        let mut out = nonce_bytes.to_vec();
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let data = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| anyhow!("Invalid base64 encoding"))?;
        if data.len() < NONCE_LEN {
            return Err(anyhow!("Invalid encrypted data length"));
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| anyhow!("Invalid nonce"))?;

        let key = self.sealing_key()?;
        let mut buf = sealed.to_vec();
        let plain = key
            .open_in_place(nonce, Aad::empty(), &mut buf)
            .map_err(|_| anyhow!("Decryption failed"))?;

        String::from_utf8(plain.to_vec()).map_err(|_| anyhow!("Invalid UTF-8 in decrypted data"))
    }

    pub fn encrypt_map(&self, values: &BTreeMap<String, String>) -> Result<String> {
        self.encrypt(&serde_json::to_string(values)?)
    }

    pub fn decrypt_map(&self, encoded: &str) -> Result<BTreeMap<String, String>> {
        Ok(serde_json::from_str(&self.decrypt(encoded)?)?)
    }
}
