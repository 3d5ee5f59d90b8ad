//! Lightweight HTML rendering of model answers

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("valid line break regex"));

/// Render model prose as HTML: `**bold**`, `*italic*` and line breaks.
///
/// The text is not HTML-escaped.
pub fn render_html(text: &str) -> String {
    let html = BOLD.replace_all(text.trim(), "<strong>$1</strong>");
    let html = ITALIC.replace_all(&html, "<em>$1</em>");
    LINE_BREAK.replace_all(&html, "<br />").into_owned()
}

/// Render an analysis failure as an HTML paragraph
pub fn render_error_html(message: &str) -> String {
    format!(
        "<p style=\"color: red;\"><strong>Error:</strong> Could not get analysis. {}</p>",
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bold_and_italic() {
        assert_eq!(
            render_html("**Busy** on *Monday*"),
            "<strong>Busy</strong> on <em>Monday</em>"
        );
    }

    #[test]
    fn test_patterns_compile() {
        for re in [&BOLD, &ITALIC, &LINE_BREAK] {
            assert!(!re.as_str().is_empty());
        }
    }

    #[test]
    fn test_render_line_breaks() {
        assert_eq!(render_html("a\r\nb\nc\rd"), "a<br />b<br />c<br />d");
    }

    #[test]
    fn test_render_trims() {
        assert_eq!(render_html("\n  Free all day \n"), "Free all day");
    }

    #[test]
    fn test_render_error_html() {
        assert_eq!(
            render_error_html("timeout"),
            "<p style=\"color: red;\"><strong>Error:</strong> Could not get analysis. timeout</p>"
        );
    }
}
