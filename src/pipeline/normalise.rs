//! Normalisation of extracted document text.
//!
//! pdfium and WordprocessingML both hand back text with layout residue:
//! CRLF line endings, trailing spaces from justified lines, runs of empty
//! lines between pages, words hyphenated across line breaks, and invisible
//! code points. None of it helps the model and all of it costs tokens.
//!
//! Rules (applied in order):
//! 1. Normalise line endings (CRLF / CR → LF)
//! 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 3. Trim trailing whitespace per line
//! 4. Re-join words hyphenated across a line break
//! 5. Collapse 3+ consecutive newlines to a single blank line
//! 6. Trim the whole text

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to raw extracted text.
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = join_hyphenated_words(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// Only a lowercase continuation is joined: "Anglo-\nSaxon" keeps its hyphen.
static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-\n(\p{Ll})").unwrap());

fn join_hyphenated_words(input: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(input, "$1$2").to_string()
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}
