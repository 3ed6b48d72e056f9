//! Line-ending normalization and line splitting.

/// Collapse every line-ending variant to `\n`.
///
/// `\r\n` becomes `\n`, then any remaining lone `\r` becomes `\n`. A trailing
/// terminator is neither added nor removed.
pub fn normalize(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split normalized text into lines.
///
/// Empty text has no lines. Otherwise the text is split on every `\n`, so a
/// trailing terminator yields a final empty line, matching how an editor
/// numbers rows.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

/// Concatenate several source texts into one side of a comparison.
///
/// Each source is normalized; a `\n` is inserted between two sources when the
/// earlier one does not already end with one.
pub fn concat_sources<'a, I>(sources: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for source in sources {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&normalize(source));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_crlf_and_cr() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn normalize_keeps_missing_terminator() {
        assert_eq!(normalize("a\r\nb"), "a\nb");
    }

    #[test]
    fn normalize_cr_cr_lf() {
        assert_eq!(normalize("a\r\r\nb"), "a\n\nb");
    }

    #[test]
    fn normalize_plain_untouched() {
        assert_eq!(normalize("a\nb\n"), "a\nb\n");
    }

    #[test]
    fn split_lines_empty() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn split_lines_trailing_newline() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn split_lines_no_trailing_newline() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn concat_inserts_separator() {
        assert_eq!(concat_sources(["a", "b\n", "c"]), "a\nb\nc");
    }

    #[test]
    fn concat_normalizes_each_source() {
        assert_eq!(concat_sources(["a\r\n", "b\r"]), "a\nb\n");
    }
}
