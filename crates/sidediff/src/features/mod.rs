//! Per-line feature extraction for cross-syntax line matching.
//!
//! [`features`] turns one line into a [`LineFeatures`] record. Everything a
//! line can share with another line (plain identifiers and the namespaced
//! `init:`, `codefrag:`, `hint:`, `htmltag:`, `htmlattr:`, `dateformat:`,
//! `dateformatarg:` and `template:` tokens) is unioned into
//! [`LineFeatures::identifiers`], so one token index over that list answers
//! "which lines share any signal with this one".

pub mod tables;
pub mod template;

use crate::signature::{self, Brace};

pub use template::{extract_literal_payload, LiteralPayload};

/// Coarse classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCategory {
    Decl,
    Call,
    Other,
}

/// A `to_char(arg, 'fmt')` / `format(arg, 'fmt')` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pub arg: String,
    pub format: String,
}

/// Features of a single line. Built on demand, discarded after scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFeatures {
    /// Plain identifiers followed by every namespaced token, deduplicated.
    pub identifiers: Vec<String>,
    pub literals: Vec<String>,
    pub numbers: Vec<String>,
    pub primary_id: Option<String>,
    pub category: LineCategory,
    /// Normalized structural fragment (without the `codefrag:` namespace).
    pub code_fragment: Option<String>,
    /// Normalized template signature (without the `template:` namespace).
    pub template: Option<String>,
    pub brace: Option<Brace>,
    pub has_else: bool,
    /// Name from an initialization idiom (without the `init:` namespace).
    pub init: Option<String>,
    pub date_format: Option<DateFormat>,
    /// Leading whitespace width, tabs counted as four columns.
    pub indent: usize,
    /// The line with surrounding whitespace removed.
    pub trimmed: String,
}

impl LineFeatures {
    /// Identifiers that are neither namespaced tokens nor hint words.
    pub fn core_identifiers(&self) -> impl Iterator<Item = &str> {
        self.identifiers
            .iter()
            .map(String::as_str)
            .filter(|id| !id.contains(':') && !tables::is_hint_word(id))
    }

    /// Tokens counted as identifier overlap when scoring: everything in
    /// [`identifiers`](Self::identifiers) except hints and the signals that
    /// are scored on their own.
    pub fn overlap_tokens(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str).filter(|id| {
            !id.starts_with("hint:")
                && !id.starts_with("codefrag:")
                && !id.starts_with("init:")
                && !id.starts_with("dateformat")
        })
    }

    pub fn hints(&self) -> impl Iterator<Item = &str> {
        self.identifiers
            .iter()
            .map(String::as_str)
            .filter(|id| id.starts_with("hint:"))
    }

    pub fn is_date_format_call(&self) -> bool {
        self.date_format.is_some()
    }
}

/// Extract the features of one line.
pub fn features(line: &str) -> LineFeatures {
    let stripped = signature::strip_statement_prefix(line);
    let literal_scan = template::scan_literals(stripped);
    let code = blank_literals(stripped, &literal_scan);

    let mut tokens = TokenList::default();

    let plain = identifiers_of(&code);
    for id in &plain {
        tokens.push(id.clone());
    }

    let mut literals = Vec::new();
    for lit in &literal_scan {
        let content = lit.content.trim();
        if content.is_empty() {
            continue;
        }
        push_unique(&mut literals, content.to_string());
        let lower = content.to_ascii_lowercase();
        if let Some(suffix) = tables::FILE_SUFFIXES.iter().find(|s| lower.ends_with(*s)) {
            let base = &content[..content.len() - suffix.len()];
            if !base.is_empty() {
                push_unique(&mut literals, base.to_string());
            }
        }
    }

    let numbers = regex!(r"\b\d+(?:\.\d+)?\b")
        .find_iter(stripped)
        .map(|m| m.as_str().to_string())
        .fold(Vec::new(), |mut acc, n| {
            push_unique(&mut acc, n);
            acc
        });

    let init = init_name(stripped);
    if let Some(name) = &init {
        tokens.push(format!("init:{name}"));
    }

    let code_fragment = template::structural_fragment(line);
    if let Some(frag) = &code_fragment {
        tokens.push(format!("codefrag:{frag}"));
    }

    let date_format = date_format_call(stripped);
    if let Some(df) = &date_format {
        tokens.push(format!("dateformat:{}", df.format));
        tokens.push(format!("dateformatarg:{}", df.arg));
    }

    let payload = template::template_payload(line);
    if let Some(payload) = &payload {
        let sig = template::normalize_signature(payload);
        if !sig.is_empty() {
            tokens.push(format!("template:{sig}"));
        }
        if let Some(tag) = template::html_tag(payload) {
            tokens.push(format!("htmltag:{tag}"));
        }
        for attr in template::html_attributes(payload) {
            tokens.push(format!("htmlattr:{attr}"));
        }
    }

    let mut hint_words: Vec<String> = plain.clone();
    let word = regex!(r"[A-Za-z][\w-]*");
    for lit in &literal_scan {
        hint_words.extend(word.find_iter(&lit.content).map(|m| m.as_str().to_ascii_lowercase()));
    }
    if let Some(payload) = &payload {
        hint_words.extend(word.find_iter(payload).map(|m| m.as_str().to_ascii_lowercase()));
    }
    for w in hint_words {
        if tables::is_hint_word(&w) {
            tokens.push(format!("hint:{w}"));
        }
    }

    let (category, decl_name) = classify(&code);

    let primary_id = decl_name
        .or_else(|| longest(plain.iter().filter(|id| !tables::is_hint_word(id))))
        .or_else(|| longest(literals.iter()));

    let has_else = regex!(r"(?i)\belse\b").is_match(&code);
    let brace = signature::brace_token(line);

    LineFeatures {
        identifiers: tokens.into_vec(),
        literals,
        numbers,
        primary_id,
        category,
        code_fragment,
        template: payload
            .as_deref()
            .map(template::normalize_signature)
            .filter(|s| !s.is_empty()),
        brace,
        has_else,
        init,
        date_format,
        indent: indent_width(line),
        trimmed: line.trim().to_string(),
    }
}

/// Name initialized by `name = new ...` or `name = ""` / `''`, lower-cased.
pub fn init_name(line: &str) -> Option<String> {
    let with_new = regex!(
        r"^\s*(?:(?:var|let|const|dim|my|local|final|auto)\s+|[A-Za-z_][\w<>,\[\]?.]*\s+)?\$?([A-Za-z_]\w*)\s*=\s*new\b"
    );
    let with_empty = regex!(
        r#"^\s*(?:(?:var|let|const|dim|my|local|string|String)\s+)?\$?([A-Za-z_]\w*)\s*=\s*(?:""|'')\s*;?\s*$"#
    );
    with_new
        .captures(line)
        .or_else(|| with_empty.captures(line))
        .map(|caps| caps[1].to_lowercase())
}

/// Detect a `to_char(arg, 'fmt')` or `format(arg, 'fmt')` call.
pub fn date_format_call(line: &str) -> Option<DateFormat> {
    let call = regex!(
        r#"(?i)\b(?:to_char|format)\s*\(\s*\$?([A-Za-z_][\w.\->]*?)\s*,\s*(?:"([^"]*)"|'([^']*)')"#
    );
    let caps = call.captures(line)?;
    let arg = last_segment(&caps[1]).to_lowercase();
    let format = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map_or(String::new(), |m| m.as_str().trim().to_lowercase());
    if arg.is_empty() || format.is_empty() {
        return None;
    }
    Some(DateFormat { arg, format })
}

/// Extract identifiers from code (literals already blanked): member-access
/// prefixes and sigils stripped, lower-cased, keywords removed.
fn identifiers_of(code: &str) -> Vec<String> {
    let chain = regex!(r"\$?[A-Za-z_]\w*(?:\s*(?:\?\.|\.|->|::)\s*\$?[A-Za-z_]\w*)*");
    let mut out = Vec::new();
    for m in chain.find_iter(code) {
        let name = last_segment(m.as_str()).trim_start_matches('$');
        if name.is_empty() || tables::is_keyword(name) {
            continue;
        }
        push_unique(&mut out, name.to_lowercase());
    }
    out
}

/// Last member of an access chain such as `$this->user.name`.
fn last_segment(chain: &str) -> &str {
    chain
        .rsplit(|c: char| c == '.' || c == '>' || c == ':')
        .next()
        .unwrap_or(chain)
        .trim()
        .trim_start_matches('$')
}

/// Classify a line, returning the declared name when there is one.
fn classify(code: &str) -> (LineCategory, Option<String>) {
    let decl = regex!(r"(?i)\b(function|fn|def)\b(?:\s+&?([A-Za-z_]\w*))?");
    if let Some(caps) = decl.captures(code) {
        if tables::is_decl_keyword(&caps[1]) {
            let name = caps.get(2).map(|m| m.as_str().to_lowercase());
            return (LineCategory::Decl, name);
        }
    }

    let call = regex!(r"\b([A-Za-z_]\w*)\s*\(");
    let first_call = call
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|name| !tables::is_control_keyword(name));

    let word = regex!(r"\b[A-Za-z_]\w*\b");
    let has_modifier = word.find_iter(code).any(|m| tables::is_decl_modifier(m.as_str()));

    match first_call {
        Some(name) if has_modifier => (LineCategory::Decl, Some(name.to_lowercase())),
        Some(_) => (LineCategory::Call, None),
        None => (LineCategory::Other, None),
    }
}

/// Replace literal spans (quotes included) with spaces, keeping offsets.
fn blank_literals(line: &str, literals: &[template::Literal]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pos = 0;
    for lit in literals {
        out.push_str(&line[pos..lit.span.start]);
        out.push(' ');
        pos = lit.span.end;
    }
    out.push_str(&line[pos..]);
    out
}

fn longest<'a>(iter: impl Iterator<Item = &'a String>) -> Option<String> {
    iter.fold(None::<&String>, |best, s| match best {
        Some(b) if b.chars().count() >= s.chars().count() => Some(b),
        _ => Some(s),
    })
    .cloned()
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Insertion-ordered, deduplicated token list.
#[derive(Default)]
struct TokenList {
    tokens: Vec<String>,
    seen: std::collections::HashSet<String>,
}

impl TokenList {
    fn push(&mut self, token: String) {
        if self.seen.insert(token.clone()) {
            self.tokens.push(token);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}
