//! Kconfig file rewriter.
//!
//! The rewriter understands just enough Kconfig to know where symbol
//! references can appear. Each line is classified by its leading keyword;
//! only the regions that hold symbols or expressions are scanned for
//! identifier tokens, and a token is replaced only if it exactly equals a
//! mapped symbol.

use tracing::trace;

use super::Rewrite;
use crate::symbol::{is_symbol_byte, SymbolMap};

/// Keywords whose remainder is a symbol name or an expression.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "config",
    "menuconfig",
    "choice",
    "if",
    "depends",
    "visible",
    "select",
    "imply",
    "default",
    "def_bool",
    "def_tristate",
    "def_int",
    "def_hex",
    "def_string",
    "range",
    "bool",
    "tristate",
    "int",
    "hex",
    "string",
    "prompt",
];

/// Block terminators that conventionally repeat the opening symbol in a
/// trailing comment.
const END_KEYWORDS: &[&str] = &["endif", "endchoice", "endmenu"];

/// Keywords that open a help block.
const HELP_KEYWORDS: &[&str] = &["help", "---help---"];

/// Width of a tab stop when measuring help text indentation.
const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Normal,
    /// After a help keyword, before the first non-blank line.
    HelpStart,
    /// Inside help text whose first line had the given indentation.
    Help { indent: usize },
    /// The previous expression line ended with `\` outside a comment.
    Continuation,
}

/// Rewrites symbol references in Kconfig text.
#[derive(Debug, Clone, Copy)]
pub struct KconfigRewriter<'a> {
    map: &'a SymbolMap,
}

impl<'a> KconfigRewriter<'a> {
    /// Create a rewriter for the given renames.
    #[must_use]
    pub fn new(map: &'a SymbolMap) -> Self {
        Self { map }
    }

    /// Rewrite a whole Kconfig file. Line endings are preserved.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> Rewrite {
        let mut out = String::with_capacity(text.len());
        let mut replacements = 0;
        let mut state = LineState::Normal;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let (body, eol) = split_eol(line);
            let (next, n) = self.rewrite_line(body, state, &mut out);
            if n > 0 {
                trace!(line = idx + 1, replacements = n, "Rewrote Kconfig line");
            }
            out.push_str(eol);
            replacements += n;
            state = next;
        }

        Rewrite {
            content: out,
            replacements,
        }
    }

    fn rewrite_line(&self, body: &str, state: LineState, out: &mut String) -> (LineState, usize) {
        match state {
            LineState::HelpStart => {
                if body.trim().is_empty() {
                    out.push_str(body);
                    return (state, 0);
                }
                // An unindented first line means the help text is empty.
                let indent = indent_width(body);
                if indent > 0 {
                    out.push_str(body);
                    return (LineState::Help { indent }, 0);
                }
            }
            LineState::Help { indent } => {
                if body.trim().is_empty() || indent_width(body) >= indent {
                    out.push_str(body);
                    return (state, 0);
                }
            }
            LineState::Continuation => return self.rewrite_tokens(body, out),
            LineState::Normal => {}
        }

        let trimmed = body.trim_start();
        let keyword_len = trimmed
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
            .count();
        let (keyword, rest) = trimmed.split_at(keyword_len);
        let head = &body[..body.len() - rest.len()];

        if HELP_KEYWORDS.contains(&keyword) {
            out.push_str(body);
            return (LineState::HelpStart, 0);
        }

        if EXPRESSION_KEYWORDS.contains(&keyword) {
            out.push_str(head);
            return self.rewrite_tokens(rest, out);
        }

        if END_KEYWORDS.contains(&keyword) {
            out.push_str(head);
            let n = self.rewrite_end_comment(rest, out);
            return (LineState::Normal, n);
        }

        out.push_str(body);
        (LineState::Normal, 0)
    }

    /// Replace mapped identifier tokens, skipping quoted strings and
    /// stopping at a `#` comment. The returned state is
    /// [`LineState::Continuation`] if the code before any comment ends
    /// with `\`.
    fn rewrite_tokens(&self, text: &str, out: &mut String) -> (LineState, usize) {
        let bytes = text.as_bytes();
        let mut replacements = 0;
        let mut code_end = bytes.len();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'#' => {
                    code_end = i;
                    out.push_str(&text[i..]);
                    break;
                }
                quote @ (b'"' | b'\'') => {
                    let end = quoted_end(bytes, i, quote);
                    out.push_str(&text[i..end]);
                    i = end;
                }
                b if is_symbol_byte(b) => {
                    let start = i;
                    while i < bytes.len() && is_symbol_byte(bytes[i]) {
                        i += 1;
                    }
                    let token = &text[start..i];
                    if let Some(new) = self.map.get(token) {
                        out.push_str(new);
                        replacements += 1;
                    } else {
                        out.push_str(token);
                    }
                }
                _ => {
                    let len = text[i..].chars().next().map_or(1, char::len_utf8);
                    out.push_str(&text[i..i + len]);
                    i += len;
                }
            }
        }

        let next = if text[..code_end].trim_end().ends_with('\\') {
            LineState::Continuation
        } else {
            LineState::Normal
        };
        (next, replacements)
    }

    /// Rewrite `# SYMBOL` after a block terminator.
    fn rewrite_end_comment(&self, rest: &str, out: &mut String) -> usize {
        if let Some(hash) = rest.find('#') {
            let comment = &rest[hash + 1..];
            let name = comment.trim();
            if rest[..hash].trim().is_empty() {
                if let Some(new) = self.map.get(name) {
                    let start = hash + 1 + (comment.len() - comment.trim_start().len());
                    out.push_str(&rest[..start]);
                    out.push_str(new);
                    out.push_str(&rest[start + name.len()..]);
                    return 1;
                }
            }
        }
        out.push_str(rest);
        0
    }
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Index just past the closing quote, or the end of input if unterminated.
fn quoted_end(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for b in line.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adxl_map() -> SymbolMap {
        [
            ("ADXL362", "ADI_ADXL362"),
            ("ADXL362_TRIGGER", "ADI_ADXL362_TRIGGER"),
            ("ADXL362_TRIGGER_GLOBAL_THREAD", "ADI_ADXL362_TRIGGER_GLOBAL_THREAD"),
        ]
        .into_iter()
        .collect()
    }

    fn rewrite(text: &str) -> Rewrite {
        let map = adxl_map();
        KconfigRewriter::new(&map).rewrite(text)
    }

    #[test]
    fn test_config_and_menuconfig_definitions() {
        let out = rewrite("menuconfig ADXL362\n\tbool \"ADXL362 sensor\"\nconfig ADXL362_TRIGGER\n");
        assert_eq!(
            out.content,
            "menuconfig ADI_ADXL362\n\tbool \"ADXL362 sensor\"\nconfig ADI_ADXL362_TRIGGER\n"
        );
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_if_block_and_endif_comment() {
        let out = rewrite("if ADXL362\n\nconfig FOO\n\tint\n\nendif # ADXL362\n");
        assert_eq!(
            out.content,
            "if ADI_ADXL362\n\nconfig FOO\n\tint\n\nendif # ADI_ADXL362\n"
        );
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_endif_comment_must_be_exact() {
        let out = rewrite("endif # ADXL362 options\nendif #ADXL362\n");
        assert_eq!(out.content, "endif # ADXL362 options\nendif #ADI_ADXL362\n");
    }

    #[test]
    fn test_depends_on_expression() {
        let out = rewrite("\tdepends on SPI && (ADXL362 || ADXL362_TRIGGER) # ADXL362\n");
        assert_eq!(
            out.content,
            "\tdepends on SPI && (ADI_ADXL362 || ADI_ADXL362_TRIGGER) # ADXL362\n"
        );
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_depends_on_continuation_lines() {
        let text = "\tdepends on ADXL362 || \\\n\t\t   ADXL362_TRIGGER\n\tdefault y\n";
        let out = rewrite(text);
        assert_eq!(
            out.content,
            "\tdepends on ADI_ADXL362 || \\\n\t\t   ADI_ADXL362_TRIGGER\n\tdefault y\n"
        );
    }

    #[test]
    fn test_select_imply_with_condition() {
        let out = rewrite("\tselect ADXL362\n\timply ADXL362_TRIGGER if ADXL362\n");
        assert_eq!(
            out.content,
            "\tselect ADI_ADXL362\n\timply ADI_ADXL362_TRIGGER if ADI_ADXL362\n"
        );
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn test_choice_and_default() {
        let text = "choice ADXL362_TRIGGER_MODE\n\tdefault ADXL362_TRIGGER_GLOBAL_THREAD\nendchoice\n";
        let out = rewrite(text);
        assert_eq!(
            out.content,
            "choice ADXL362_TRIGGER_MODE\n\tdefault ADI_ADXL362_TRIGGER_GLOBAL_THREAD\nendchoice\n"
        );
    }

    #[test]
    fn test_range_and_visible_if() {
        let map: SymbolMap = [("FIFO_MAX", "ADI_FIFO_MAX"), ("ADXL362", "ADI_ADXL362")]
            .into_iter()
            .collect();
        let out = KconfigRewriter::new(&map)
            .rewrite("\trange 0 FIFO_MAX\nmenu \"ADXL362\"\n\tvisible if ADXL362\n");
        assert_eq!(
            out.content,
            "\trange 0 ADI_FIFO_MAX\nmenu \"ADXL362\"\n\tvisible if ADI_ADXL362\n"
        );
    }

    #[test]
    fn test_prompt_condition() {
        let out = rewrite("\tbool \"Trigger for ADXL362\" if ADXL362\n\tprompt \"x\" if !ADXL362\n");
        assert_eq!(
            out.content,
            "\tbool \"Trigger for ADXL362\" if ADI_ADXL362\n\tprompt \"x\" if !ADI_ADXL362\n"
        );
    }

    #[test]
    fn test_default_string_value_untouched() {
        let out = rewrite("\tdefault \"ADXL362\" if ADXL362\n");
        assert_eq!(out.content, "\tdefault \"ADXL362\" if ADI_ADXL362\n");
    }

    #[test]
    fn test_help_text_untouched() {
        let text = "config ADXL362\n\tbool \"ADXL362\"\n\thelp\n\t  Enable if ADXL362 is wired.\n\t  depends on ADXL362 wiring\n\n\t  More text.\n\nconfig OTHER\n\tdepends on ADXL362\n";
        let out = rewrite(text);
        assert_eq!(
            out.content,
            "config ADI_ADXL362\n\tbool \"ADXL362\"\n\thelp\n\t  Enable if ADXL362 is wired.\n\t  depends on ADXL362 wiring\n\n\t  More text.\n\nconfig OTHER\n\tdepends on ADI_ADXL362\n"
        );
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_backslash_in_comment_is_not_continuation() {
        let text = "\tdepends on SPI # see C:\\\n\thelp\n\t  select ADXL362 when wired.\n";
        let out = rewrite(text);
        assert_eq!(out.content, text);
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn test_help_indent_follows_first_help_line() {
        let text = "\thelp\n\tText at the keyword's own indent.\n\tselect ADXL362 stays prose.\nconfig ADXL362\n";
        let out = rewrite(text);
        assert_eq!(
            out.content,
            "\thelp\n\tText at the keyword's own indent.\n\tselect ADXL362 stays prose.\nconfig ADI_ADXL362\n"
        );
    }

    #[test]
    fn test_help_ends_below_first_line_indent() {
        let out = rewrite("\thelp\n\n\t    Deep text.\n\t  select ADXL362\n");
        assert_eq!(out.content, "\thelp\n\n\t    Deep text.\n\t  select ADI_ADXL362\n");
    }

    #[test]
    fn test_empty_help_block() {
        let out = rewrite("\thelp\n\nconfig ADXL362\n");
        assert_eq!(out.content, "\thelp\n\nconfig ADI_ADXL362\n");
    }

    #[test]
    fn test_legacy_help_keyword() {
        let out = rewrite("\t---help---\n\t  select ADXL362\n\tselect ADXL362\n");
        assert_eq!(out.content, "\t---help---\n\t  select ADXL362\n\tselect ADI_ADXL362\n");
    }

    #[test]
    fn test_word_boundaries() {
        let out = rewrite("\tdepends on ADXL3620 || MY_ADXL362 || ADXL362_FOO\n");
        assert_eq!(out.replacements, 0);
        assert_eq!(
            out.content,
            "\tdepends on ADXL3620 || MY_ADXL362 || ADXL362_FOO\n"
        );
    }

    #[test]
    fn test_comments_source_and_unknown_lines_untouched() {
        let text = "# ADXL362 driver\nsource \"drivers/ADXL362/Kconfig\"\ncomment \"ADXL362\"\nADXL362_VAR := 1\n";
        let out = rewrite(text);
        assert_eq!(out.content, text);
        assert!(!out.is_changed());
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let out = rewrite("\tdepends on adxl362\n");
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let out = rewrite("config ADXL362\r\n\tselect ADXL362_TRIGGER");
        assert_eq!(
            out.content,
            "config ADI_ADXL362\r\n\tselect ADI_ADXL362_TRIGGER"
        );
    }

    #[test]
    fn test_mappings_do_not_chain() {
        let map: SymbolMap = [("A", "B"), ("B", "C")].into_iter().collect();
        let out = KconfigRewriter::new(&map).rewrite("\tdepends on A && B\n");
        assert_eq!(out.content, "\tdepends on B && C\n");
    }

    #[test]
    fn test_non_ascii_text_preserved() {
        let out = rewrite("\tdepends on ADXL362 # capteur d'accélération\n");
        assert_eq!(
            out.content,
            "\tdepends on ADI_ADXL362 # capteur d'accélération\n"
        );
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("\thelp"), 8);
        assert_eq!(indent_width("\t  text"), 10);
        assert_eq!(indent_width("  \ttext"), 8);
        assert_eq!(indent_width("text"), 0);
    }

    #[test]
    fn test_quoted_end() {
        let s = br#""a \" b" rest"#;
        assert_eq!(quoted_end(s, 0, b'"'), 8);
        assert_eq!(quoted_end(b"\"open", 0, b'"'), 5);
    }
}
