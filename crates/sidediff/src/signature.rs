//! Coarse per-line keys.
//!
//! [`line_key`] is a tie-breaker for the edit-script search and the
//! uniqueness key for patience anchors. [`comparison_key`] decides whether two
//! differing lines are still a textual match candidate. Neither ever forces a
//! line to be reported as equal.

use crate::features::{self, tables, template};

pub use crate::features::template::is_builder_call;

/// Single-line text prefix of the template dialect (`@:<td>...`).
const STATEMENT_PREFIX: &str = "@:";

/// A line that is only an opening or closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brace {
    Open,
    Close,
}

impl Brace {
    pub fn sentinel(self) -> &'static str {
        match self {
            Brace::Open => "brace_open",
            Brace::Close => "brace_close",
        }
    }
}

/// Strip the template dialect's single-line statement prefix, if present.
///
/// Lines without the prefix are returned unchanged, indentation included.
pub fn strip_statement_prefix(line: &str) -> &str {
    line.trim_start()
        .strip_prefix(STATEMENT_PREFIX)
        .unwrap_or(line)
}

/// Recognize a brace-only line, bare or wrapped in inline-code delimiters
/// (`<% } %>`, `<?php } ?>`, `@{`).
pub fn brace_token(line: &str) -> Option<Brace> {
    let brace = regex!(r"^(?:<%\s*|<\?(?:php)?\s*|@)?([{}])\s*;?\s*(?:%>|\?>)?$");
    let trimmed = strip_statement_prefix(line).trim();
    let caps = brace.captures(trimmed)?;
    match &caps[1] {
        "{" => Some(Brace::Open),
        _ => Some(Brace::Close),
    }
}

/// Coarse matching key of a line.
///
/// Brace-only lines map to a fixed sentinel. Otherwise the first
/// non-keyword `name(` is returned lower-cased, then the first non-keyword
/// identifier; sigils are ignored.
pub fn line_key(line: &str) -> Option<String> {
    if let Some(brace) = brace_token(line) {
        return Some(brace.sentinel().to_string());
    }
    let stripped = strip_statement_prefix(line).replace('$', "");

    let call = regex!(r"([A-Za-z_]\w*)\s*\(");
    if let Some(name) = call
        .captures_iter(&stripped)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .find(|name| !tables::is_keyword(name))
    {
        return Some(name.to_lowercase());
    }

    let ident = regex!(r"[A-Za-z_]\w*");
    ident
        .find_iter(&stripped)
        .map(|m| m.as_str())
        .find(|word| !tables::is_keyword(word))
        .map(str::to_string)
}

/// Comparison key used by the line diff to decide whether two differing
/// lines are still a textual match candidate.
///
/// Prefers an `init:<name>` initialization pattern, then the literal payload
/// of a builder call, then the left-trimmed line.
pub fn comparison_key(line: &str) -> String {
    let trimmed = strip_statement_prefix(line).trim_start();
    if let Some(name) = features::init_name(trimmed) {
        return format!("init:{name}");
    }
    if let Some(literal) = template::builder_literal(trimmed) {
        return format!("append-literal:{literal}");
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_prefix() {
        assert_eq!(strip_statement_prefix("  @:<td>"), "<td>");
        assert_eq!(strip_statement_prefix("  <td>"), "  <td>");
    }

    #[test]
    fn braces() {
        assert_eq!(brace_token("{"), Some(Brace::Open));
        assert_eq!(brace_token("    }"), Some(Brace::Close));
        assert_eq!(brace_token("};"), Some(Brace::Close));
        assert_eq!(brace_token("<% } %>"), Some(Brace::Close));
        assert_eq!(brace_token("<?php } ?>"), Some(Brace::Close));
        assert_eq!(brace_token("@{"), Some(Brace::Open));
        assert_eq!(brace_token("} else {"), None);
    }

    #[test]
    fn line_key_braces_share_sentinel() {
        assert_eq!(line_key("  }").as_deref(), Some("brace_close"));
        assert_eq!(line_key("<% } %>").as_deref(), Some("brace_close"));
        assert_eq!(line_key("{").as_deref(), Some("brace_open"));
    }

    #[test]
    fn line_key_prefers_call() {
        assert_eq!(line_key("$x = GetUser($id);").as_deref(), Some("getuser"));
        assert_eq!(line_key("if (ready) { Render(); }").as_deref(), Some("render"));
    }

    #[test]
    fn line_key_falls_back_to_identifier() {
        assert_eq!(line_key("return total;").as_deref(), Some("total"));
        assert_eq!(line_key("$count = 0;").as_deref(), Some("count"));
    }

    #[test]
    fn line_key_none() {
        assert_eq!(line_key(""), None);
        assert_eq!(line_key("   "), None);
        assert_eq!(line_key("return;"), None);
        assert_eq!(line_key("42;"), None);
    }

    #[test]
    fn comparison_key_variants() {
        assert_eq!(comparison_key("  $html = \"\";"), "init:html");
        assert_eq!(
            comparison_key("StringBuilder sb = new StringBuilder();"),
            "init:sb"
        );
        assert_eq!(
            comparison_key(r#"    sb.Append("<tr>");"#),
            "append-literal:<tr>"
        );
        assert_eq!(comparison_key("   <tr>"), "<tr>");
        assert_eq!(comparison_key("@:<tr>"), "<tr>");
    }
}
