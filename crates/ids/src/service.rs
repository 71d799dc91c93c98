//! Internal implementation of entity identifiers.

use crate::{IdError, IdResult};
use std::{fmt, str::FromStr};

/// Length of the random suffix on freshly generated identifiers.
pub const GENERATED_SUFFIX_LEN: usize = 6;

const MAX_PREFIX_LEN: usize = 8;
const MAX_SUFFIX_LEN: usize = 16;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Canonical `{PREFIX}-{SUFFIX}` identifier for a stored record.
///
/// Once constructed the identifier is guaranteed to be canonical, so it can be compared,
/// hashed and written to storage without further checks.
///
/// # Construction
/// - [`EntityId::generate`] allocates a fresh identifier for a new record.
/// - [`EntityId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Generates a new identifier with the given prefix.
    ///
    /// The suffix is the base-36 rendering of the low bits of a v4 UUID, so two calls are
    /// very unlikely to collide. Callers that keep a collection should still retry on the
    /// rare collision (see the store's id allocation).
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `prefix` is not 1 to 8 uppercase ASCII letters.
    pub fn generate(prefix: &str) -> IdResult<Self> {
        if !Self::is_valid_prefix(prefix) {
            return Err(IdError::InvalidInput(format!(
                "prefix must be 1-{} uppercase ASCII letters, got: '{}'",
                MAX_PREFIX_LEN, prefix
            )));
        }

        let mut bits = uuid::Uuid::new_v4().as_u128();
        let mut suffix = [0u8; GENERATED_SUFFIX_LEN];
        for slot in suffix.iter_mut().rev() {
            *slot = BASE36[(bits % 36) as usize];
            bits /= 36;
        }

        let suffix = std::str::from_utf8(&suffix)
            .map_err(|e| IdError::InvalidInput(e.to_string()))?;
        Ok(Self(format!("{}-{}", prefix, suffix)))
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not `{PREFIX}-{SUFFIX}` with an
    /// uppercase letter prefix and an uppercase base-36 suffix.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::InvalidInput(format!(
            "identifier must look like PREFIX-SUFFIX (e.g. P-001), got: '{}'",
            input
        )))
    }

    /// Returns true if `input` is a canonical identifier.
    pub fn is_canonical(input: &str) -> bool {
        let Some((prefix, suffix)) = input.split_once('-') else {
            return false;
        };

        Self::is_valid_prefix(prefix)
            && !suffix.is_empty()
            && suffix.len() <= MAX_SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'Z'))
    }

    fn is_valid_prefix(prefix: &str) -> bool {
        !prefix.is_empty()
            && prefix.len() <= MAX_PREFIX_LEN
            && prefix.bytes().all(|b| b.is_ascii_uppercase())
    }

    /// Returns the prefix part (before the first `-`).
    pub fn prefix(&self) -> &str {
        self.0.split_once('-').map(|(p, _)| p).unwrap_or_default()
    }

    /// Returns true if this identifier carries `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix() == prefix
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    /// Equivalent to [`EntityId::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_canonical_id_with_prefix() {
        let id = EntityId::generate("A").expect("generate should succeed");

        assert!(EntityId::is_canonical(id.as_str()));
        assert_eq!(id.prefix(), "A");
        assert_eq!(id.as_str().len(), "A-".len() + GENERATED_SUFFIX_LEN);
    }

    #[test]
    fn test_generate_rejects_lowercase_prefix() {
        let result = EntityId::generate("post");

        match result {
            Err(IdError::InvalidInput(msg)) => assert!(msg.contains("uppercase")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_generate_is_unlikely_to_repeat() {
        let a = EntityId::generate("P").unwrap();
        let b = EntityId::generate("P").unwrap();
        let c = EntityId::generate("P").unwrap();

        assert!(a != b || b != c);
    }

    #[test]
    fn test_parse_accepts_seed_style_ids() {
        for input in ["P-001", "D-002", "POST-0A1B2", "NTF-ZZZZZ"] {
            let id = EntityId::parse(input).expect("seed id should parse");
            assert_eq!(id.to_string(), input);
        }
    }

    #[test]
    fn test_parse_rejects_lowercase_suffix() {
        assert!(EntityId::parse("W-ab12").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(EntityId::parse("P001").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(EntityId::parse("-001").is_err());
        assert!(EntityId::parse("P-").is_err());
    }

    #[test]
    fn test_parse_rejects_overlong_suffix() {
        assert!(EntityId::parse("P-0123456789ABCDEFG").is_err());
    }

    #[test]
    fn test_from_str_matches_parse() {
        let id: EntityId = "T-9X".parse().expect("should parse");
        assert!(id.has_prefix("T"));
        assert!(!id.has_prefix("W"));
    }

    #[test]
    fn test_serde_round_trip_uses_plain_string() {
        let id = EntityId::parse("N-001").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"N-001\"");

        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_rejects_malformed_id() {
        let result: Result<EntityId, _> = serde_json::from_str("\"not an id\"");
        assert!(result.is_err());
    }
}
