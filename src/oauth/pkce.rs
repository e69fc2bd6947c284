use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::error::SpotlinkError;

/// Bytes of entropy behind a generated verifier. 32 bytes encode to 43 chars.
pub const DEFAULT_VERIFIER_ENTROPY: usize = 32;

const MIN_VERIFIER_ENTROPY: usize = 32;
// 96 bytes encode to exactly 128 chars, the RFC 7636 upper bound.
const MAX_VERIFIER_ENTROPY: usize = 96;

const STATE_ENTROPY: usize = 16;

/// Verifier/challenge pair for a single authorization attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceMaterial {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl std::fmt::Debug for PkceMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceMaterial")
            .field("code_verifier", &"<redacted>")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

impl PkceMaterial {
    /// Build PKCE material from caller-supplied random bytes.
    ///
    /// The verifier is the base64url (no padding) encoding of `entropy`, so it
    /// only contains unreserved characters. `entropy` must be 32 to 96 bytes
    /// long, which keeps the verifier within 43..=128 characters.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, SpotlinkError> {
        if !(MIN_VERIFIER_ENTROPY..=MAX_VERIFIER_ENTROPY).contains(&entropy.len()) {
            return Err(SpotlinkError::InvalidConfig(format!(
                "PKCE entropy must be {MIN_VERIFIER_ENTROPY}-{MAX_VERIFIER_ENTROPY} bytes, got {}",
                entropy.len()
            )));
        }
        let code_verifier = URL_SAFE_NO_PAD.encode(entropy);
        let code_challenge = compute_challenge(&code_verifier);
        Ok(Self {
            code_verifier,
            code_challenge,
        })
    }
}

/// Generate fresh PKCE material from the thread-local CSPRNG.
pub fn generate_pkce() -> PkceMaterial {
    let mut buf = [0u8; DEFAULT_VERIFIER_ENTROPY];
    rand::rng().fill(&mut buf);
    let code_verifier = URL_SAFE_NO_PAD.encode(buf);
    let code_challenge = compute_challenge(&code_verifier);
    PkceMaterial {
        code_verifier,
        code_challenge,
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque anti-CSRF value echoed back by the authorization redirect.
pub fn generate_state() -> String {
    let mut buf = [0u8; STATE_ENTROPY];
    rand::rng().fill(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
