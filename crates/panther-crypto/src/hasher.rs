use panther_types::Digest;
use serde_json::Value;
use sha3::{Digest as Sha3Digest, Sha3_512};

use crate::canonical::CanonicalEncoder;
use crate::error::EncodingError;

/// SHA3-512 hashing and digest composition.
///
/// Composition hashes the concatenated *hex renderings* of two digests, not
/// their raw bytes. External verifiers reproduce it with nothing more than a
/// SHA3-512 over an ASCII string.
pub struct HashEngine;

impl HashEngine {
    /// SHA3-512 of raw bytes.
    pub fn digest(data: &[u8]) -> Digest {
        let out = Sha3_512::digest(data);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&out);
        Digest::from_bytes(bytes)
    }

    /// SHA3-512 of raw bytes, as 128 lowercase hex characters.
    pub fn digest_hex(data: &[u8]) -> String {
        Self::digest(data).to_hex()
    }

    /// `digest(hex(a) ++ hex(b))`.
    pub fn compose(a: &Digest, b: &Digest) -> Digest {
        let mut hasher = Sha3_512::new();
        hasher.update(a.to_hex().as_bytes());
        hasher.update(b.to_hex().as_bytes());
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&hasher.finalize());
        Digest::from_bytes(bytes)
    }

    /// Composition over arbitrary hex strings, exactly as given.
    pub fn compose_hex(a: &str, b: &str) -> String {
        let mut joined = String::with_capacity(a.len() + b.len());
        joined.push_str(a);
        joined.push_str(b);
        Self::digest_hex(joined.as_bytes())
    }

    /// Digest of the canonical encoding of a value.
    pub fn digest_canonical(value: &Value) -> Result<Digest, EncodingError> {
        let bytes = CanonicalEncoder::encode(value)?;
        Ok(Self::digest(&bytes))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(data: &[u8], expected: &Digest) -> bool {
        Self::digest(data) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EMPTY_LIST: &str = "888b858b73d5d34fedab0f07663436931a95c73d6d7808edc868767bb9172f9e542fb7bb1ad1dbe988ceff0aaffde2012bc0e7d1914e986269f46d93651436a5";

    #[test]
    fn known_answers() {
        assert_eq!(
            HashEngine::digest_hex(b""),
            "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26"
        );
        assert_eq!(
            HashEngine::digest_hex(b"abc"),
            "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eec53f0"
        );
    }

    #[test]
    fn canonical_empty_list() {
        let d = HashEngine::digest_canonical(&json!([])).unwrap();
        assert_eq!(d.to_hex(), EMPTY_LIST);
    }

    #[test]
    fn compose_uses_hex_text() {
        let input = HashEngine::digest_canonical(&json!({
            "prompt": "hello", "providers": [], "guidelines": [], "salt": null
        }))
        .unwrap();
        assert_eq!(
            input.to_hex(),
            "c88adf110df01336156e448f8118dd5c2f148ba947ad758bafd73509524555ad384fda46f1b9663d725fd8ce6cf49823b4270a597b2f834983f9cf4899aff658"
        );
        let results = HashEngine::digest_canonical(&json!([])).unwrap();
        let combined = HashEngine::compose(&input, &results);
        assert_eq!(
            combined.to_hex(),
            "d3a46d054320fdde40c30558777b337a299a683320b0c1e721700349659aa35cf0196946271aea6157cb77fe5f005979e70d8ab54d43cbb17a3a73c6932e9092"
        );
        assert_eq!(
            HashEngine::compose_hex(&input.to_hex(), &results.to_hex()),
            combined.to_hex()
        );
    }

    #[test]
    fn compose_is_ordered() {
        let a = HashEngine::digest(b"a");
        let b = HashEngine::digest(b"b");
        assert_ne!(HashEngine::compose(&a, &b), HashEngine::compose(&b, &a));
    }

    #[test]
    fn verify_detects_tampering() {
        let d = HashEngine::digest(b"original");
        assert!(HashEngine::verify(b"original", &d));
        assert!(!HashEngine::verify(b"tampered", &d));
    }

    #[test]
    fn encoding_errors_propagate() {
        let mut v = json!(0);
        for _ in 0..=crate::MAX_DEPTH {
            v = json!([v]);
        }
        assert!(matches!(
            HashEngine::digest_canonical(&v),
            Err(EncodingError::TooDeep { .. })
        ));
    }
}
