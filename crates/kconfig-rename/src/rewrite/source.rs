//! `CONFIG_` reference rewriter for C, CMake and `.conf` files.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::{Captures, Regex};

use super::Rewrite;
use crate::symbol::SymbolMap;

/// Whole-word `CONFIG_<NAME>` references. ASCII word boundaries keep the
/// pattern usable on files that are not valid UTF-8.
static CONFIG_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)CONFIG_([A-Za-z0-9_]+)").expect("CONFIG_ reference pattern is valid")
});

/// Rewrites `CONFIG_<OLD>` to `CONFIG_<NEW>` in arbitrary text files.
#[derive(Debug, Clone, Copy)]
pub struct SourceRewriter<'a> {
    map: &'a SymbolMap,
}

impl<'a> SourceRewriter<'a> {
    /// Create a rewriter for the given renames.
    #[must_use]
    pub fn new(map: &'a SymbolMap) -> Self {
        Self { map }
    }

    /// Rewrite file contents. Returns `None` if no reference matched.
    #[must_use]
    pub fn rewrite(&self, content: &[u8]) -> Option<Rewrite<Vec<u8>>> {
        let mut replacements = 0;
        let rewritten = CONFIG_REFERENCE.replace_all(content, |caps: &Captures<'_>| {
            let name = std::str::from_utf8(&caps[1]).ok();
            match name.and_then(|n| self.map.get(n)) {
                Some(new) => {
                    replacements += 1;
                    format!("CONFIG_{new}").into_bytes()
                }
                None => caps[0].to_vec(),
            }
        });

        match rewritten {
            Cow::Owned(content) if replacements > 0 => Some(Rewrite {
                content,
                replacements,
            }),
            _ => None,
        }
    }
}
