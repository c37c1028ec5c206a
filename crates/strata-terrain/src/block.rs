//! Block identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strata_density::{DensityError, Identifier};

/// A validated block id such as `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Identifier);

impl BlockId {
    pub fn new(namespace: &str, path: &str) -> Result<Self, DensityError> {
        Identifier::new(namespace, path).map(Self)
    }

    pub fn minecraft(path: &str) -> Result<Self, DensityError> {
        Identifier::minecraft(path).map(Self)
    }

    pub fn id(&self) -> &Identifier {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.namespace()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Identifier> for BlockId {
    fn from(id: Identifier) -> Self {
        Self(id)
    }
}

impl FromStr for BlockId {
    type Err = DensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Shorthand for vanilla block constants known to be valid.
pub(crate) fn vanilla(path: &'static str) -> BlockId {
    match BlockId::minecraft(path) {
        Ok(block) => block,
        Err(err) => unreachable!("invalid built-in block id {path}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let block: BlockId = "strata:moon_stone".parse().unwrap();
        assert_eq!(block.namespace(), "strata");
        assert_eq!(block.to_string(), "strata:moon_stone");
        assert_eq!("sand".parse::<BlockId>().unwrap(), vanilla("sand"));
    }

    #[test]
    fn test_serde_is_plain_string() {
        let block = vanilla("deepslate");
        assert_eq!(serde_json::to_string(&block).unwrap(), "\"minecraft:deepslate\"");
        let parsed: BlockId = ron::from_str("\"gravel\"").unwrap();
        assert_eq!(parsed, vanilla("gravel"));
    }
}
