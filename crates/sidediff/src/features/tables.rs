//! Static keyword, markup and scripting tables used by the line heuristics.
//!
//! All entries are lower-case; look-ups lower-case their argument first.

/// Words never treated as identifiers.
pub const KEYWORDS: &[&str] = &[
    "abstract", "and", "array", "as", "async", "await", "bool", "boolean", "break", "byte",
    "case", "catch", "char", "class", "const", "continue", "decimal", "def", "default", "dim",
    "do", "double", "echo", "else", "elseif", "elsif", "empty", "end", "endif", "endforeach",
    "endwhile", "extends", "false", "final", "finally", "float", "fn", "for", "foreach",
    "function", "global", "if", "implements", "import", "in", "include", "include_once",
    "instanceof", "int", "interface", "internal", "is", "isset", "let", "long", "namespace",
    "new", "not", "null", "object", "or", "override", "php", "print", "private", "protected",
    "public", "readonly", "ref", "require", "require_once", "return", "sealed", "self",
    "short", "static", "string", "struct", "sub", "switch", "then", "this", "throw", "true",
    "try", "typeof", "uint", "unset", "use", "using", "var", "virtual", "void", "while",
    "with", "xor", "yield",
    // builder-call and output plumbing carries no meaning of its own
    "append", "appendformat", "appendline", "tostring", "write", "writeline",
];

/// Keywords that look like `name(` but are control flow, not calls.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "elseif", "elsif", "for", "foreach", "while", "switch", "catch", "return", "using",
    "lock", "typeof", "sizeof", "function", "fn", "def", "sub", "new", "and", "or", "not",
];

/// Declaration keywords that make a line a declaration on their own.
pub const DECL_KEYWORDS: &[&str] = &["function", "fn", "def"];

/// Modifiers that turn an `identifier(` line into a declaration.
pub const DECL_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "override", "virtual", "abstract",
    "final", "async", "sealed", "extern", "pub",
];

/// Common markup tag names.
pub const HTML_TAGS: &[&str] = &[
    "a", "body", "br", "button", "div", "em", "fieldset", "form", "h1", "h2", "h3", "h4",
    "head", "hr", "html", "iframe", "img", "input", "label", "legend", "li", "link", "meta",
    "ol", "option", "p", "pre", "script", "select", "span", "strong", "style", "table",
    "tbody", "td", "textarea", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Common markup attribute names.
pub const HTML_ATTRS: &[&str] = &[
    "action", "align", "alt", "border", "cellpadding", "cellspacing", "checked", "class",
    "colspan", "disabled", "for", "height", "href", "id", "maxlength", "method", "name",
    "onblur", "onchange", "onclick", "onfocus", "onkeydown", "onkeyup", "onload", "onsubmit",
    "readonly", "rel", "rowspan", "selected", "size", "src", "style", "tabindex", "target",
    "title", "type", "valign", "value", "width",
];

/// Common scripting keywords and browser APIs.
pub const JS_HINTS: &[&str] = &[
    "addeventlistener", "alert", "confirm", "console", "document", "getelementbyid",
    "getelementsbyname", "getelementsbytagname", "innerhtml", "jquery", "json", "location",
    "onclick", "parseint", "queryselector", "settimeout", "submit", "window",
];

/// File suffixes stripped from literals to produce a second literal.
pub const FILE_SUFFIXES: &[&str] = &[
    ".php", ".aspx", ".ascx", ".cshtml", ".html", ".htm", ".jsp", ".asp", ".js", ".css",
];

pub fn is_keyword(word: &str) -> bool {
    contains_ci(KEYWORDS, word)
}

pub fn is_control_keyword(word: &str) -> bool {
    contains_ci(CONTROL_KEYWORDS, word)
}

pub fn is_decl_keyword(word: &str) -> bool {
    contains_ci(DECL_KEYWORDS, word)
}

pub fn is_decl_modifier(word: &str) -> bool {
    contains_ci(DECL_MODIFIERS, word)
}

/// True if the word is any markup or scripting hint.
pub fn is_hint_word(word: &str) -> bool {
    contains_ci(HTML_TAGS, word) || contains_ci(HTML_ATTRS, word) || contains_ci(JS_HINTS, word)
}

fn contains_ci(table: &[&str], word: &str) -> bool {
    if word.bytes().any(|b| b.is_ascii_uppercase()) {
        let lower = word.to_ascii_lowercase();
        table.contains(&lower.as_str())
    } else {
        table.contains(&word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_lower_case() {
        for table in [KEYWORDS, CONTROL_KEYWORDS, DECL_MODIFIERS, HTML_TAGS, HTML_ATTRS, JS_HINTS] {
            for word in table {
                assert_eq!(*word, word.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn lookups_ignore_case() {
        assert!(is_keyword("Return"));
        assert!(is_hint_word("DIV"));
        assert!(is_hint_word("getElementById"));
        assert!(!is_hint_word("customer"));
        assert!(is_decl_modifier("Public"));
    }
}
