//! HMAC-SHA256 signing of the opaque state payload.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{state_error, Error, StateErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies encoded state payloads.
///
/// The state travels through the provider redirect and comes back
/// attacker-modifiable. Signing it lets the callback reject tampered values
/// instead of storing a token under a forged place id.
#[derive(Clone)]
pub struct StateSigner {
    secret: SecretString,
}

impl StateSigner {
    /// Create a new signer.
    ///
    /// # Arguments
    ///
    /// * `secret` - Shared signing secret
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Compute the hex-encoded signature of `payload`.
    pub fn sign(&self, payload: &str) -> Result<String, Error> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify a hex-encoded signature of `payload` in constant time.
    pub fn verify(&self, payload: &str, signature: &str) -> Result<(), Error> {
        let expected = hex::decode(signature).map_err(|_| {
            state_error(StateErrorKind::InvalidSignature, "Invalid signature format")
        })?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&expected).map_err(|_| {
            state_error(StateErrorKind::InvalidSignature, "State signature mismatch")
        })
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| state_error(StateErrorKind::Encoding, "Invalid HMAC key"))
    }
}

impl std::fmt::Debug for StateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSigner").finish_non_exhaustive()
    }
}
