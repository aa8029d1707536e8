//! Symbol rewriting for Kconfig and source files.
//!
//! Two rewriters share a [`SymbolMap`](crate::symbol::SymbolMap):
//!
//! - **Kconfig files**: [`KconfigRewriter`] walks the file line by line and
//!   replaces symbol references in definitions, `if` blocks, dependency
//!   expressions, `select`/`imply` targets, defaults, ranges and prompt
//!   conditions. Help text, quoted strings and comments are left alone,
//!   except for the conventional `endif # SYMBOL` trailer.
//!
//! - **Source files**: [`SourceRewriter`] replaces whole-word
//!   `CONFIG_<SYMBOL>` references in C sources, headers, CMake files and
//!   `.conf` fragments. It works on raw bytes.
//!
//! # Example
//!
//! ```
//! use kconfig_rename::rewrite::KconfigRewriter;
//! use kconfig_rename::symbol::SymbolMap;
//!
//! let map: SymbolMap = [("ADXL362", "ADI_ADXL362")].into_iter().collect();
//! let rewritten = KconfigRewriter::new(&map).rewrite("config ADXL362\n\tbool \"ADXL362\"\n");
//!
//! assert_eq!(rewritten.content, "config ADI_ADXL362\n\tbool \"ADXL362\"\n");
//! assert_eq!(rewritten.replacements, 1);
//! ```

mod kconfig;
mod source;

pub use kconfig::KconfigRewriter;
pub use source::SourceRewriter;

/// Output of a rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite<T = String> {
    /// The rewritten content.
    pub content: T,
    /// Number of symbol references replaced.
    pub replacements: usize,
}

impl<T> Rewrite<T> {
    /// Whether anything was replaced.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.replacements > 0
    }
}
