//! Per-player reconnection secrets.
//!
//! A secret is handed out exactly once (in the `joined` event) and afterwards
//! only its blake3 digest is kept. `Debug` never prints the value so secrets
//! cannot leak through `tracing` fields.

use std::fmt;

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SECRET_LEN: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn generate() -> Self {
        Self(Alphanumeric.sample_string(&mut rand::rng(), SECRET_LEN))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> SecretDigest {
        SecretDigest(blake3::hash(self.0.as_bytes()))
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// Stored form of a secret. Comparison on `blake3::Hash` is constant time.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretDigest(blake3::Hash);

impl SecretDigest {
    pub fn matches(&self, candidate: &Secret) -> bool {
        candidate.digest() == *self
    }
}

impl fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretDigest(..)")
    }
}
