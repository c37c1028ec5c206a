//! Namespaced identifiers (`namespace:path`) used for noises, blocks and fluids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DensityError;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A validated `namespace:path` identifier.
///
/// Namespaces allow `[a-z0-9_.-]`, paths additionally allow `/`. A bare path
/// such as `stone` is read as `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    full: String,
    split: usize,
}

impl Identifier {
    /// Builds an identifier from its two halves.
    pub fn new(namespace: &str, path: &str) -> Result<Self, DensityError> {
        validate(namespace, path, &format!("{namespace}:{path}"))?;
        Ok(Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        })
    }

    /// Builds an identifier from halves known to be valid.
    pub(crate) fn new_unchecked(namespace: &str, path: &str) -> Self {
        Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        }
    }

    /// Shorthand for an identifier in the default namespace.
    pub fn minecraft(path: &str) -> Result<Self, DensityError> {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }
}

fn validate(namespace: &str, path: &str, raw: &str) -> Result<(), DensityError> {
    let invalid = |reason| DensityError::InvalidIdentifier {
        value: raw.to_string(),
        reason,
    };
    if namespace.is_empty() {
        return Err(invalid("empty namespace"));
    }
    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    if !namespace
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-'))
    {
        return Err(invalid("namespace allows only [a-z0-9_.-]"));
    }
    if !path
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'/'))
    {
        return Err(invalid("path allows only [a-z0-9_.-/]"));
    }
    Ok(())
}

impl FromStr for Identifier {
    type Err = DensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => {
                validate(namespace, path, s)?;
                Ok(Self {
                    full: s.to_string(),
                    split: namespace.len(),
                })
            }
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }
}

impl TryFrom<String> for Identifier {
    type Error = DensityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.full
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_path_gets_default_namespace() {
        let id: Identifier = "stone".parse().unwrap();
        assert_eq!(id.as_str(), "minecraft:stone");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.path(), "stone");
    }

    #[test]
    fn test_explicit_namespace_is_kept() {
        let id: Identifier = "strata:moon_sand".parse().unwrap();
        assert_eq!(id.namespace(), "strata");
        assert_eq!(id.path(), "moon_sand");
    }

    #[test]
    fn test_nested_path_allowed() {
        let id: Identifier = "minecraft:overworld/continents".parse().unwrap();
        assert_eq!(id.path(), "overworld/continents");
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        for raw in ["", "Stone", "minecraft:", ":stone", "mine craft:stone", "a:b:c"] {
            assert!(
                raw.parse::<Identifier>().is_err(),
                "{raw:?} should not parse as an identifier"
            );
        }
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = Identifier::minecraft("deepslate").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:deepslate\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
