//! Kconfig symbol names and rename maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix the build system adds to every Kconfig symbol in generated code.
pub const CONFIG_PREFIX: &str = "CONFIG_";

/// A validated Kconfig symbol name, without the `CONFIG_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and validate a symbol name. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSymbol`] if the name is empty, contains
    /// characters other than ASCII letters, digits and `_`, or carries the
    /// `CONFIG_` prefix.
    pub fn parse(input: &str) -> Result<Self> {
        let name = input.trim();
        if name.is_empty() {
            return Err(Error::invalid_symbol(input, "symbol is empty"));
        }
        if !name.bytes().all(is_symbol_byte) {
            return Err(Error::invalid_symbol(
                input,
                "contains characters outside [A-Za-z0-9_]",
            ));
        }
        if name.starts_with(CONFIG_PREFIX) {
            return Err(Error::invalid_symbol(
                input,
                "drop the CONFIG_ prefix, it is added by the build system",
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// The symbol name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `candidate` belongs to this symbol's family.
    ///
    /// The symbol itself always does. In strict mode other members must
    /// continue with `_` (`ADXL362_TRIGGER`), otherwise any name starting
    /// with the symbol text counts (`ADXL3620` too).
    #[must_use]
    pub fn is_family_member(&self, candidate: &str, strict: bool) -> bool {
        match candidate.strip_prefix(self.as_str()) {
            Some("") => true,
            Some(rest) if strict => rest.starts_with('_'),
            Some(_) => true,
            None => false,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Bytes allowed in a Kconfig symbol name.
#[must_use]
pub fn is_symbol_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// An ordered set of `old -> new` symbol renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolMap(BTreeMap<String, String>);

impl SymbolMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive renames for every discovered member of `old`'s family by
    /// swapping the `old` prefix for `new`.
    #[must_use]
    pub fn derive<I, S>(old: &Symbol, new: &Symbol, discovered: I, strict: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for name in discovered {
            let name = name.as_ref();
            if !old.is_family_member(name, strict) {
                continue;
            }
            let renamed = format!("{new}{}", &name[old.as_str().len()..]);
            map.insert(name, renamed);
        }
        map
    }

    /// Add a rename. Identity renames are ignored.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        let (old, new) = (old.into(), new.into());
        if old != new {
            self.0.insert(old, new);
        }
    }

    /// Look up the new name for `old`.
    #[must_use]
    pub fn get(&self, old: &str) -> Option<&str> {
        self.0.get(old).map(String::as_str)
    }

    /// Number of renames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no renames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate renames in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SymbolMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (old, new) in iter {
            map.insert(old, new);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::parse(name).unwrap()
    }

    #[test]
    fn test_parse_valid_symbol() {
        assert_eq!(sym("ADXL362").as_str(), "ADXL362");
        assert_eq!(sym("  BME280\n").as_str(), "BME280");
        assert_eq!(sym("adi_adxl362").as_str(), "adi_adxl362");
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = Symbol::parse("   ").unwrap_err();
        assert!(err.is_invalid_symbol());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        assert!(Symbol::parse("ADXL-362").is_err());
        assert!(Symbol::parse("ADXL 362").is_err());
        assert!(Symbol::parse("adi,adxl362").is_err());
    }

    #[test]
    fn test_parse_rejects_config_prefix() {
        let err = Symbol::parse("CONFIG_ADXL362").unwrap_err();
        assert!(err.to_string().contains("CONFIG_"));
    }

    #[test]
    fn test_family_member_strict() {
        let s = sym("ADXL362");
        assert!(s.is_family_member("ADXL362", true));
        assert!(s.is_family_member("ADXL362_TRIGGER", true));
        assert!(!s.is_family_member("ADXL3620", true));
        assert!(!s.is_family_member("ADXL36", true));
        assert!(!s.is_family_member("MY_ADXL362", true));
    }

    #[test]
    fn test_family_member_loose() {
        let s = sym("ADXL362");
        assert!(s.is_family_member("ADXL3620", false));
        assert!(s.is_family_member("ADXL362_TRIGGER", false));
        assert!(!s.is_family_member("ADXL345", false));
    }

    #[test]
    fn test_derive_swaps_prefix() {
        let map = SymbolMap::derive(
            &sym("ADXL362"),
            &sym("ADI_ADXL362"),
            ["ADXL362", "ADXL362_TRIGGER", "ADXL362_TRIGGER_OWN_THREAD", "BME280"],
            true,
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("ADXL362"), Some("ADI_ADXL362"));
        assert_eq!(map.get("ADXL362_TRIGGER"), Some("ADI_ADXL362_TRIGGER"));
        assert_eq!(
            map.get("ADXL362_TRIGGER_OWN_THREAD"),
            Some("ADI_ADXL362_TRIGGER_OWN_THREAD")
        );
        assert_eq!(map.get("BME280"), None);
    }

    #[test]
    fn test_derive_drops_identity() {
        let map = SymbolMap::derive(&sym("ADXL362"), &sym("ADXL362"), ["ADXL362"], true);
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter_is_ordered() {
        let map: SymbolMap = [("B", "Y"), ("A", "X")].into_iter().collect();
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn test_symbol_map_serializes_as_object() {
        let map: SymbolMap = [("ADXL362", "ADI_ADXL362")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"ADXL362":"ADI_ADXL362"}"#);
    }
}
