use std::io::IsTerminal;
use std::ops::Range;

use clap::ValueEnum;

/// Color configuration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal and NO_COLOR env var.
    #[default]
    Auto,
    /// Always emit ANSI color codes.
    Always,
    /// Never emit ANSI color codes.
    Never,
}

/// Colors used when rendering a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Normal,
    Red,
    Green,
    Yellow,
    Cyan,
    Dim,
    /// Inverse red, for changed spans on the left.
    HighlightRed,
    /// Inverse green, for changed spans on the right.
    HighlightGreen,
    Reset,
}

impl Color {
    /// Get the ANSI escape sequence for this color.
    pub fn ansi_code(self) -> &'static str {
        match self {
            Color::Normal => "",
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Dim => "\x1b[2m",
            Color::HighlightRed => "\x1b[7;31m",
            Color::HighlightGreen => "\x1b[7;32m",
            Color::Reset => "\x1b[0m",
        }
    }
}

/// Check if color should be used for the given mode and stream.
///
/// Respects the `NO_COLOR` environment variable (<https://no-color.org/>)
/// and, in Auto mode, whether the stream is a terminal.
pub fn use_color(mode: ColorMode, is_terminal: bool) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            is_terminal
        }
    }
}

/// Check if stdout should use color.
pub fn use_color_stdout(mode: ColorMode) -> bool {
    use_color(mode, std::io::stdout().is_terminal())
}

/// Wrap text in an ANSI color if enabled.
pub fn colorize(text: &str, color: Color, enabled: bool) -> String {
    if !enabled || color == Color::Normal {
        return text.to_string();
    }
    format!("{}{}{}", color.ansi_code(), text, Color::Reset.ansi_code())
}

/// Render `text` in `base`, with the byte `spans` in `highlight`.
///
/// Spans must be sorted, non-overlapping and on char boundaries.
pub fn highlight_spans(
    text: &str,
    spans: &[Range<usize>],
    base: Color,
    highlight: Color,
    enabled: bool,
) -> String {
    if !enabled {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + spans.len() * 16);
    let mut pos = 0;
    for span in spans {
        if span.start < pos || span.end > text.len() {
            continue;
        }
        out.push_str(&colorize(&text[pos..span.start], base, true));
        out.push_str(&colorize(&text[span.clone()], highlight, true));
        pos = span.end;
    }
    out.push_str(&colorize(&text[pos..], base, true));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes() {
        assert!(use_color(ColorMode::Always, false));
        assert!(!use_color(ColorMode::Never, true));
    }

    #[test]
    fn colorize_disabled_is_plain() {
        assert_eq!(colorize("x", Color::Red, false), "x");
        assert_eq!(colorize("x", Color::Normal, true), "x");
        assert_eq!(colorize("x", Color::Red, true), "\x1b[31mx\x1b[0m");
    }

    #[test]
    fn highlight_wraps_spans() {
        let s = highlight_spans("abcd", &[1..3], Color::Normal, Color::HighlightRed, true);
        assert_eq!(s, "a\x1b[7;31mbc\x1b[0md");
        assert_eq!(
            highlight_spans("abcd", &[1..3], Color::Normal, Color::HighlightRed, false),
            "abcd"
        );
    }
}
