use std::sync::OnceLock;

use regex::Regex;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// A run of card text with one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap())
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*\s][^*]*?)\*|`([^`]+)`").unwrap())
}

/// Split card markup into styled segments.
///
/// Understands `**bold**`, `__bold__`, `*italic*` and `` `code` ``; anything
/// else is passed through as plain text.
pub fn parse_markup(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in bold_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_italics(&mut segments, &text[last..whole.start()], false);
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        push_italics(&mut segments, inner, true);
        last = whole.end();
    }
    push_italics(&mut segments, &text[last..], false);

    segments
}

fn push_italics(segments: &mut Vec<Segment>, text: &str, bold: bool) {
    let mut last = 0;
    for caps in italic_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push(segments, &text[last..whole.start()], bold, false);
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        push(segments, inner, bold, true);
        last = whole.end();
    }
    push(segments, &text[last..], bold, false);
}

fn push(segments: &mut Vec<Segment>, text: &str, bold: bool, italic: bool) {
    if !text.is_empty() {
        segments.push(Segment {
            text: text.to_string(),
            bold,
            italic,
        });
    }
}

/// Render card markup for a terminal, dropping the markers
pub fn render_markup(text: &str, use_color: bool) -> String {
    parse_markup(text)
        .iter()
        .map(|seg| style_segment(seg, use_color))
        .collect()
}

fn style_segment(seg: &Segment, use_color: bool) -> String {
    if !use_color || (!seg.bold && !seg.italic) {
        return seg.text.clone();
    }
    let mut styled = String::new();
    if seg.bold {
        styled.push_str(Color::BOLD);
    }
    if seg.italic {
        styled.push_str(Color::ITALIC);
    }
    styled.push_str(&seg.text);
    styled.push_str(Color::RESET);
    styled
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Word-wrap card markup by visible width, styling each word on its own line
pub fn wrap_markup(text: &str, prefix: &str, max_width: usize, use_color: bool) -> Vec<String> {
    let effective_width = max_width.saturating_sub(prefix.chars().count()).max(1);
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in markup_words(line) {
            let width: usize = word.iter().map(|seg| seg.text.chars().count()).sum();
            if current_width > 0 && current_width + 1 + width > effective_width {
                lines.push(format!("{}{}", prefix, current));
                current.clear();
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            for seg in &word {
                current.push_str(&style_segment(seg, use_color));
            }
            current_width += width;
        }
        lines.push(format!("{}{}", prefix, current));
    }

    lines
}

/// Split one line into whitespace-separated words, keeping each piece's style
fn markup_words(line: &str) -> Vec<Vec<Segment>> {
    let mut words = Vec::new();
    let mut word: Vec<Segment> = Vec::new();

    for seg in parse_markup(line) {
        let mut piece = String::new();
        for ch in seg.text.chars() {
            if ch.is_whitespace() {
                push(&mut word, &piece, seg.bold, seg.italic);
                piece.clear();
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            } else {
                piece.push(ch);
            }
        }
        push(&mut word, &piece, seg.bold, seg.italic);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bold_term() {
        let segments = parse_markup("The capital of France is **Paris**.");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].text, "Paris");
        assert!(segments[1].bold);
        assert!(!segments[2].bold);
    }

    #[test]
    fn test_parse_italic_and_code() {
        let segments = parse_markup("Use *ser* or `estar`");
        let styled: Vec<&str> = segments.iter().filter(|s| s.italic).map(|s| s.text.as_str()).collect();
        assert_eq!(styled, vec!["ser", "estar"]);
    }

    #[test]
    fn test_render_without_color_strips_markers() {
        assert_eq!(render_markup("Water is **H2O**", false), "Water is H2O");
        assert_eq!(render_markup("2 * 3 = 6", false), "2 * 3 = 6");
    }

    #[test]
    fn test_render_with_color() {
        assert_eq!(
            render_markup("**Romulus**", true),
            format!("{}Romulus{}", Color::BOLD, Color::RESET)
        );
    }

    #[test]
    fn test_wrap_plain_words() {
        let lines = wrap_markup("one two three four", "  ", 11, false);
        assert_eq!(lines, vec!["  one two", "  three", "  four"]);
    }

    #[test]
    fn test_bold_run_wraps_without_markers() {
        let text = "The answer is **very important indeed**.";
        let lines = wrap_markup(text, "", 20, false);
        assert_eq!(lines, vec!["The answer is very", "important indeed."]);

        let colored = wrap_markup(text, "", 20, true);
        assert!(colored.iter().all(|line| !line.contains('*')));
        assert_eq!(
            colored[1],
            format!("{b}important{r} {b}indeed{r}.", b = Color::BOLD, r = Color::RESET)
        );
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_markup("first\n\nsecond", "", 80, false);
        assert_eq!(lines, vec!["first", "", "second"]);
    }
}
