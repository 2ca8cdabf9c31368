//! Pokemon lookup key

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejected lookup key. Checked before any cache or store is consulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidKey {
    #[error("Lookup key must not be empty")]
    Empty,
}

/// A non-empty pokemon name or number, as accepted by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PokemonName(String);

impl PokemonName {
    pub fn parse(raw: &str) -> Result<Self, InvalidKey> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(InvalidKey::Empty);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PokemonName {
    type Error = InvalidKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PokemonName> for String {
    fn from(name: PokemonName) -> Self {
        name.0
    }
}

impl fmt::Display for PokemonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(PokemonName::parse(""), Err(InvalidKey::Empty));
        assert_eq!(PokemonName::parse("   "), Err(InvalidKey::Empty));
    }

    #[test]
    fn test_parse_trims() {
        let name = PokemonName::parse(" pikachu ").unwrap();
        assert_eq!(name.as_str(), "pikachu");
        assert_eq!(name.to_string(), "pikachu");
    }

    #[test]
    fn test_numeric_names_are_valid() {
        assert!(PokemonName::parse("0").is_ok());
        assert!(PokemonName::parse("25").is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<PokemonName>(r#""""#).is_err());
        let name: PokemonName = serde_json::from_str(r#""ditto""#).unwrap();
        assert_eq!(name.as_str(), "ditto");
    }
}
