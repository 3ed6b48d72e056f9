//! String-literal scanning, builder-call payload extraction and markup
//! signatures.
//!
//! A "builder call" is a line that emits output through a string builder
//! (`sb.Append("...")`, `.AppendLine(...)`, `.AppendFormat(...)`) or through a
//! concatenation assignment (`$html .= "...";`). Its payload is the text the
//! call emits, which is what gets compared against a plain markup line on the
//! other side.

use std::ops::Range;

use crate::signature::{self, Brace};

use super::tables;

/// Placeholder substituted for any interpolation or expression splice.
pub const EXPR_PLACEHOLDER: &str = "{expr}";

/// Full-width reverse solidus, used by some encodings in place of `\`.
const FULLWIDTH_BACKSLASH: char = '\u{FF3C}';

/// A quoted string literal found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// Unescaped content, with every backslash form folded to `\`.
    pub content: String,
    /// For each char of `content`, the byte range it came from in the line.
    pub char_spans: Vec<Range<usize>>,
    /// Byte range of the whole literal, quotes included.
    pub span: Range<usize>,
}

/// Literal payload of a line together with a map back to line positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPayload {
    pub text: String,
    /// For each char of `text`, the byte range it covers in the source line.
    pub map: Vec<Range<usize>>,
}

impl LiteralPayload {
    /// The line itself, mapped onto itself.
    pub fn identity(line: &str) -> Self {
        Self {
            text: line.to_string(),
            map: line
                .char_indices()
                .map(|(i, c)| i..i + c.len_utf8())
                .collect(),
        }
    }
}

/// Scan a line for single- or double-quoted literals.
///
/// `\\`, `\"` and `\'` are unescaped; other escapes are kept verbatim. An
/// unterminated quote ends the scan.
pub fn scan_literals(line: &str) -> Vec<Literal> {
    let mut literals = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '"' && c != '\'' {
            continue;
        }
        let quote = c;
        let mut content = String::new();
        let mut char_spans = Vec::new();
        let mut end = None;

        while let Some((i, ch)) = chars.next() {
            if ch == quote {
                end = Some(i + 1);
                break;
            }
            if ch == '\\' {
                match chars.peek() {
                    Some(&(j, next)) if next == '\\' || next == '"' || next == '\'' => {
                        chars.next();
                        content.push(next);
                        char_spans.push(i..j + next.len_utf8());
                    }
                    _ => {
                        content.push('\\');
                        char_spans.push(i..i + 1);
                    }
                }
                continue;
            }
            if ch == FULLWIDTH_BACKSLASH {
                content.push('\\');
            } else {
                content.push(ch);
            }
            char_spans.push(i..i + ch.len_utf8());
        }

        match end {
            Some(end) => literals.push(Literal {
                content,
                char_spans,
                span: start..end,
            }),
            None => break,
        }
    }

    literals
}

/// True if the line emits text through a builder call or `.=` concatenation.
pub fn is_builder_call(line: &str) -> bool {
    builder_args_start(line).is_some()
}

/// Byte offset where the emitted arguments of a builder call begin.
fn builder_args_start(line: &str) -> Option<usize> {
    let call = regex!(r"(?i)\.\s*append(?:line|format)?\s*\(");
    if let Some(m) = call.find(line) {
        return Some(m.end());
    }
    line.find(".=").map(|i| i + 2)
}

/// Extract the literal payload of a builder-call line.
///
/// Falls back to [`LiteralPayload::identity`] for any other line, and for
/// builder calls that carry no literal at all.
pub fn extract_literal_payload(line: &str) -> LiteralPayload {
    let Some(start) = builder_args_start(line) else {
        return LiteralPayload::identity(line);
    };
    let literals = scan_literals(&line[start..]);
    if literals.is_empty() {
        return LiteralPayload::identity(line);
    }
    let mut text = String::new();
    let mut map = Vec::new();
    for lit in literals {
        text.push_str(&lit.content);
        map.extend(
            lit.char_spans
                .into_iter()
                .map(|r| r.start + start..r.end + start),
        );
    }
    LiteralPayload { text, map }
}

/// Concatenated literal content of a builder call, if it has any.
pub fn builder_literal(line: &str) -> Option<String> {
    let start = builder_args_start(line)?;
    let literals = scan_literals(&line[start..]);
    if literals.is_empty() {
        return None;
    }
    Some(literals.into_iter().map(|l| l.content).collect())
}

/// The text a line emits, with expression splices replaced by
/// [`EXPR_PLACEHOLDER`].
///
/// Builder calls yield their literals joined by placeholders where the
/// concatenation carries an expression; bare markup lines yield themselves.
pub fn template_payload(line: &str) -> Option<String> {
    let stripped = signature::strip_statement_prefix(line).trim();
    if let Some(start) = builder_args_start(stripped) {
        let args = &stripped[start..];
        let literals = scan_literals(args);
        if literals.is_empty() {
            return None;
        }
        let mut payload = String::new();
        let mut prev_end = 0;
        for (idx, lit) in literals.iter().enumerate() {
            let gap = &args[prev_end..lit.span.start];
            let spliced = if idx == 0 {
                gap.chars().any(|c| c.is_alphanumeric() || c == '$')
            } else {
                gap.chars()
                    .any(|c| !c.is_whitespace() && !matches!(c, '+' | '.' | '&'))
            };
            if spliced {
                payload.push_str(EXPR_PLACEHOLDER);
            }
            payload.push_str(&lit.content);
            prev_end = lit.span.end;
        }
        let tail = args[prev_end..].trim_start();
        if tail.starts_with(['+', '.', '&']) && tail.chars().any(|c| c.is_alphanumeric()) {
            payload.push_str(EXPR_PLACEHOLDER);
        }
        return Some(replace_interpolations(&payload));
    }
    if stripped.starts_with('<') {
        return Some(replace_interpolations(stripped));
    }
    None
}

/// Replace interpolation and expression-splice syntax with [`EXPR_PLACEHOLDER`].
pub fn replace_interpolations(text: &str) -> String {
    let splice = regex!(
        r#"(?x)
        <%[=:\#]?.*?%>                          # server tags
        | <\?(?:=|php)?.*?\?>                   # processing-instruction echo
        | \{\$[^}]*\}                           # {$var}
        | \$\{[^}]*\}                           # ${expr}
        | \#\{[^}]*\}                           # #{expr}
        | \{\{.*?\}\}                           # {{ expr }}
        | \{\d+(?:[,:][^}]*)?\}                 # {0} / {0:fmt}
        | @\((?:[^()]|\([^()]*\))*\)            # @( expr )
        | @[A-Za-z_][\w.]*(?:\([^)]*\))?        # @Model.Name
        | \$[A-Za-z_]\w*(?:->\w+|\[[^\]]*\])*   # $var->prop / $var['k']
        "#
    );
    let replaced = splice.replace_all(text, EXPR_PLACEHOLDER);
    let repeated = regex!(r"(?:\{expr\}\s*){2,}");
    repeated.replace_all(&replaced, EXPR_PLACEHOLDER).into_owned()
}

/// Fold a payload into a comparable signature: whitespace collapsed,
/// delimiters tightened, quotes canonicalized, lower-cased.
pub fn normalize_signature(payload: &str) -> String {
    let collapsed = regex!(r"\s+").replace_all(payload.trim(), " ");
    let tightened = regex!(r#"\s*([<>=;,(){}/"'])\s*"#).replace_all(&collapsed, "$1");
    tightened.replace('\'', "\"").to_lowercase()
}

/// Tag name of a markup payload, with a leading `/` for closing tags.
pub fn html_tag(payload: &str) -> Option<String> {
    let tag = regex!(r"^\s*<\s*(/?)\s*([A-Za-z][\w-]*)");
    let caps = tag.captures(payload)?;
    Some(format!("{}{}", &caps[1], caps[2].to_ascii_lowercase()))
}

/// Attribute names of a markup payload, lower-cased, in order, deduplicated.
pub fn html_attributes(payload: &str) -> Vec<String> {
    if html_tag(payload).is_none() {
        return Vec::new();
    }
    let attr = regex!(r#"[\s"']([A-Za-z_:@][\w:.-]*)\s*="#);
    let mut attrs: Vec<String> = Vec::new();
    for caps in attr.captures_iter(payload) {
        let name = caps[1].to_ascii_lowercase();
        if !attrs.contains(&name) {
            attrs.push(name);
        }
    }
    attrs
}

/// Normalized structural fragment of a line, for cross-syntax block
/// alignment.
///
/// Recognizes braces, markup, a lone identifier, a CSS-like `selector {` and
/// a `property: value;` line, looking through builder calls at the payload
/// they emit.
pub fn structural_fragment(line: &str) -> Option<String> {
    let source = if is_builder_call(line) {
        template_payload(line)?
    } else {
        signature::strip_statement_prefix(line).trim().to_string()
    };
    let source = source.trim();
    if source.is_empty() {
        return None;
    }

    if let Some(brace) = signature::brace_token(source) {
        return Some(match brace {
            Brace::Open => "{".to_string(),
            Brace::Close => "}".to_string(),
        });
    }
    if source.starts_with('<') {
        return Some(format!("html:{}", normalize_signature(source)));
    }

    let lone = regex!(r"^\$?([A-Za-z_]\w*)\s*;?$");
    if let Some(caps) = lone.captures(source) {
        let word = &caps[1];
        if !tables::is_keyword(word) {
            return Some(format!("id:{}", word.to_ascii_lowercase()));
        }
        return None;
    }

    let selector = regex!(r#"^([.#]?[A-Za-z_*][\w\-\s.#:>+~,\[\]="*]*?)\s*\{$"#);
    if let Some(caps) = selector.captures(source) {
        let sel = &caps[1];
        let first = sel.split(|c: char| !c.is_alphanumeric() && c != '_').next();
        if !first.is_some_and(tables::is_keyword) {
            return Some(format!("sel:{}", normalize_signature(sel)));
        }
    }

    let property = regex!(r"^([A-Za-z-]+)\s*:\s*([^;{}]+?)\s*;?$");
    if let Some(caps) = property.captures(source) {
        let prop = &caps[1];
        if !tables::is_keyword(prop) {
            return Some(format!(
                "css:{}:{}",
                prop.to_ascii_lowercase(),
                normalize_signature(&caps[2])
            ));
        }
    }

    None
}
