//! Match highlighting for field values.
//!
//! Three display modes are supported:
//! - **Line**: every line holding at least one match, each followed by a
//!   blank line
//! - **All**: the whole value, dot matching newlines
//! - **Windowed(n)**: each match with up to `n` characters of context on
//!   either side; windows that touch or overlap are joined into one run
//!
//! Rendering is a pure function of its inputs. Span offsets are byte
//! offsets that always fall on `char` boundaries; window widths are counted
//! in characters.

use crossterm::style::Stylize;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::ops::Range;

/// How much of a matching value to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Lines containing a match (`l`)
    LineOnly,
    /// The entire value (`a`)
    EntireValue,
    /// Matches with this many characters of context either side
    Windowed(usize),
}

impl DisplayMode {
    /// Parse a `--show-values` argument: `a`, `l` or a non-negative integer.
    pub fn parse(arg: &str) -> Result<Self, String> {
        match arg {
            "a" => Ok(Self::EntireValue),
            "l" => Ok(Self::LineOnly),
            other => other.parse::<usize>().map(Self::Windowed).map_err(|_| {
                "Show values style must be one of 'a, l' or an integer".to_string()
            }),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOnly => f.write_str("l"),
            Self::EntireValue => f.write_str("a"),
            Self::Windowed(width) => write!(f, "{}", width),
        }
    }
}

/// One match within a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// A user pattern compiled for searching and for display.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    case_insensitive: bool,
    single_line: Regex,
    dot_all: Regex,
}

impl MatchPattern {
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let single_line = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        let dot_all = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self {
            case_insensitive,
            single_line,
            dot_all,
        })
    }

    /// Regex used to decide whether a record matches at all.
    pub fn regex(&self) -> &Regex {
        &self.single_line
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Non-overlapping matches of the pattern in `text`, in order.
    pub fn spans(&self, text: &str, mode: DisplayMode) -> Vec<MatchSpan> {
        let regex = match mode {
            DisplayMode::EntireValue => &self.dot_all,
            DisplayMode::LineOnly | DisplayMode::Windowed(_) => &self.single_line,
        };
        regex
            .find_iter(text)
            .map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}

/// How matched text is distinguished from its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Black on yellow terminal colours
    Ansi,
    /// `[match]`, for output that is not a terminal
    Brackets,
}

impl Marker {
    fn mark(self, out: &mut String, matched: &str) {
        match self {
            Self::Ansi => out.push_str(&matched.black().on_dark_yellow().to_string()),
            Self::Brackets => {
                out.push('[');
                out.push_str(matched);
                out.push(']');
            }
        }
    }
}

/// Render `text` with every match of `pattern` marked.
///
/// Returns an empty string when nothing matches; otherwise the output ends
/// with a blank line.
pub fn render(text: &str, pattern: &MatchPattern, mode: DisplayMode, marker: Marker) -> String {
    match mode {
        DisplayMode::LineOnly => render_lines(text, pattern, marker),
        DisplayMode::EntireValue => render_all(text, pattern, marker),
        DisplayMode::Windowed(width) => render_windows(text, pattern, width, marker),
    }
}

fn render_lines(text: &str, pattern: &MatchPattern, marker: Marker) -> String {
    let mut out = String::new();
    for line in split_lines(text) {
        let spans = pattern.spans(line, DisplayMode::LineOnly);
        if spans.is_empty() {
            continue;
        }
        mark_spans(&mut out, line, &spans, marker);
        out.push_str("\n\n");
    }
    out
}

/// Split on every line boundary: `\n`, `\r\n`, a lone `\r`, and the
/// vertical tab, form feed, file/group/record separators, NEL, and the
/// Unicode line and paragraph separators. No empty trailing line is
/// produced.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if !is_line_boundary(ch) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn render_all(text: &str, pattern: &MatchPattern, marker: Marker) -> String {
    let spans = pattern.spans(text, DisplayMode::EntireValue);
    if spans.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(text.len() + 2);
    mark_spans(&mut out, text, &spans, marker);
    out.push_str("\n\n");
    out
}

fn mark_spans(out: &mut String, text: &str, spans: &[MatchSpan], marker: Marker) {
    let mut cursor = 0;
    for span in spans {
        out.push_str(&text[cursor..span.start]);
        marker.mark(out, &text[span.range()]);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
}

/// A piece of windowed output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    /// Start of a new, non-contiguous window
    Break,
    Plain(Range<usize>),
    Match(Range<usize>),
}

fn render_windows(text: &str, pattern: &MatchPattern, width: usize, marker: Marker) -> String {
    let spans = pattern.spans(text, DisplayMode::Windowed(width));
    if spans.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for piece in window_pieces(text, &spans, width) {
        match piece {
            Piece::Break => out.push('\n'),
            Piece::Plain(range) => out.push_str(&text[range]),
            Piece::Match(range) => marker.mark(&mut out, &text[range]),
        }
    }

    let mut trimmed = out.trim().to_string();
    trimmed.push_str("\n\n");
    trimmed
}

/// Lay out context windows around `spans`.
///
/// `reach` is where the previous window's trailing context ended. If it
/// runs into the current match, that context is cut at the match start; if
/// it reaches the current window's start, the gap is filled in and the two
/// windows form one run; otherwise a new window begins.
///
/// A new window only gets leading context when `width` full characters
/// precede the match.
fn window_pieces(text: &str, spans: &[MatchSpan], width: usize) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(spans.len() * 3 + 1);
    let mut reach: Option<usize> = None;

    for span in spans {
        let leading = chars_before(text, span.start, width);
        let window_start = leading.unwrap_or(0);
        match reach {
            Some(reach) if reach > span.start => {
                if let Some(Piece::Plain(trailing)) = pieces.last_mut() {
                    trailing.end = span.start;
                }
            }
            Some(reach) if reach >= window_start => {
                pieces.push(Piece::Plain(reach..span.start));
            }
            _ => {
                pieces.push(Piece::Break);
                pieces.push(Piece::Plain(leading.unwrap_or(span.start)..span.start));
            }
        }

        let window_end = chars_after(text, span.end, width);
        pieces.push(Piece::Match(span.range()));
        pieces.push(Piece::Plain(span.end..window_end));
        reach = Some(window_end);
    }

    pieces
}

/// Byte offset `count` characters before `pos`, or `None` when fewer than
/// `count` characters precede it.
fn chars_before(text: &str, pos: usize, count: usize) -> Option<usize> {
    if count == 0 {
        return Some(pos);
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(idx, _)| idx)
}

/// Byte offset `count` characters after `pos`, clamped to the end.
fn chars_after(text: &str, pos: usize, count: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(idx, _)| pos + idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEUGIAT: &str = "Lorem ipsum dolor sit amet, eu eam option expetendis. An equidem \
                           noluisse appareat his. Feugiat meliore vix ex, vel ad elit feugiat.";
    const DICAM: &str = "In qui doming evertitur, cum dicam vituperatoribus id. Insolens \
                         assueverit quo an, et case choro minimum usu, te sit mediocrem.\n\
                         Te placerat deserunt cum, et per enim mutat audire, putent graeco \
                         eligendi ne vix. Ut nisl ornatus nec, discere fierent eu has.";
    const MOLESTIE: &str = "Cu usu molestie invidunt molestie usu cu.";

    fn plain(text: &str, pattern: &str, mode: DisplayMode) -> String {
        let pattern = MatchPattern::new(pattern, false).unwrap();
        render(text, &pattern, mode, Marker::Brackets)
    }

    #[test]
    fn test_parse_display_mode() {
        assert_eq!(DisplayMode::parse("a"), Ok(DisplayMode::EntireValue));
        assert_eq!(DisplayMode::parse("l"), Ok(DisplayMode::LineOnly));
        assert_eq!(DisplayMode::parse("10"), Ok(DisplayMode::Windowed(10)));
        assert_eq!(DisplayMode::parse("0"), Ok(DisplayMode::Windowed(0)));
    }

    #[test]
    fn test_parse_display_mode_rejects_other_values() {
        for bad in ["m", "-1", "1.5", ""] {
            let err = DisplayMode::parse(bad).unwrap_err();
            assert_eq!(err, "Show values style must be one of 'a, l' or an integer");
        }
    }

    #[test]
    fn test_line_mode_single_line() {
        assert_eq!(
            plain(FEUGIAT, "Feugiat", DisplayMode::LineOnly),
            "Lorem ipsum dolor sit amet, eu eam option expetendis. An equidem noluisse \
             appareat his. [Feugiat] meliore vix ex, vel ad elit feugiat.\n\n"
        );
    }

    #[test]
    fn test_line_mode_omits_lines_without_matches() {
        assert_eq!(
            plain(DICAM, "dicam", DisplayMode::LineOnly),
            "In qui doming evertitur, cum [dicam] vituperatoribus id. Insolens assueverit \
             quo an, et case choro minimum usu, te sit mediocrem.\n\n"
        );
    }

    #[test]
    fn test_line_mode_emits_each_matching_line() {
        let out = plain("alpha one\nbeta\nalpha two", "alpha", DisplayMode::LineOnly);
        assert_eq!(out, "[alpha] one\n\n[alpha] two\n\n");
        assert!(out.split("\n\n").filter(|l| !l.is_empty()).all(|l| l.contains('[')));
    }

    #[test]
    fn test_entire_value_keeps_all_lines() {
        let out = plain(DICAM, "dicam", DisplayMode::EntireValue);
        assert_eq!(out, DICAM.replacen("dicam", "[dicam]", 1) + "\n\n");
    }

    #[test]
    fn test_entire_value_round_trips_unmarked_text() {
        let text = "one fish\ntwo fish\nred fish\nblue fish";
        let out = plain(text, "fish|o", DisplayMode::EntireValue);
        assert_eq!(out.replace(['[', ']'], ""), format!("{}\n\n", text));
        assert_eq!(out.matches('[').count(), 6);
    }

    #[test]
    fn test_entire_value_dot_matches_newline() {
        let out = plain("start\nend", "t.e", DisplayMode::EntireValue);
        assert_eq!(out, "star[t\ne]nd\n\n");
        assert_eq!(plain("start\nend", "t.e", DisplayMode::LineOnly), "");
    }

    #[test]
    fn test_windowed_clips_context() {
        assert_eq!(
            plain(FEUGIAT, "Feugiat", DisplayMode::Windowed(5)),
            "his. [Feugiat] meli\n\n"
        );
    }

    #[test]
    fn test_windowed_context_crosses_lines() {
        assert_eq!(
            plain(DICAM, r"mediocrem\.", DisplayMode::Windowed(5)),
            "sit [mediocrem.]\nTe p\n\n"
        );
    }

    #[test]
    fn test_windowed_case_insensitive() {
        let pattern = MatchPattern::new("MELIORE", true).unwrap();
        assert!(pattern.is_case_insensitive());
        assert_eq!(
            render(FEUGIAT, &pattern, DisplayMode::Windowed(5), Marker::Brackets),
            "giat [meliore] vix\n\n"
        );
    }

    #[test]
    fn test_windowed_joined_matches() {
        assert_eq!(
            plain("molestie invidunt molestie usu cu.", "molestie", DisplayMode::Windowed(10)),
            "[molestie] invidunt [molestie] usu cu.\n\n"
        );
        assert_eq!(
            plain("ab molestie invidunt molestie usu cu", "molestie", DisplayMode::Windowed(10)),
            "[molestie] invidunt [molestie] usu cu\n\n"
        );
    }

    #[test]
    fn test_windowed_match_near_start_has_no_leading_context() {
        assert_eq!(
            plain(MOLESTIE, "molestie", DisplayMode::Windowed(10)),
            "[molestie] invidunt [molestie] usu cu.\n\n"
        );
        // Exactly `width` characters before the match are kept.
        assert_eq!(
            plain("abcdeX", "X", DisplayMode::Windowed(5)),
            "abcde[X]\n\n"
        );
    }

    #[test]
    fn test_windowed_overlapping_context_is_cut() {
        assert_eq!(
            plain(MOLESTIE, ".{5}molestie.{5}", DisplayMode::Windowed(5)),
            "[ usu molestie invi][dunt molestie usu ]cu.\n\n"
        );
    }

    #[test]
    fn test_windowed_separate_windows_start_new_lines() {
        assert_eq!(
            plain("aaa X bbbbbbbbbbbbbbb X ccc", "X", DisplayMode::Windowed(2)),
            "a [X] b\nb [X] c\n\n"
        );
    }

    #[test]
    fn test_windowed_touching_windows_join() {
        // The first window ends where the second one starts.
        assert_eq!(
            plain("aaXbbbbXa", "X", DisplayMode::Windowed(2)),
            "aa[X]bbbb[X]a\n\n"
        );
    }

    #[test]
    fn test_windowed_zero_marks_only_matches() {
        assert_eq!(
            plain("the cat sat on the mat", "[cm]at", DisplayMode::Windowed(0)),
            "[cat]\n[mat]\n\n"
        );
    }

    #[test]
    fn test_windowed_counts_characters_not_bytes() {
        assert_eq!(
            plain("ééé ñ ààà", "ñ", DisplayMode::Windowed(2)),
            "é [ñ] à\n\n"
        );
    }

    #[test]
    fn test_line_mode_splits_on_bare_carriage_returns() {
        assert_eq!(
            plain("foo\rbar\rfoo", "foo", DisplayMode::LineOnly),
            "[foo]\n\n[foo]\n\n"
        );
        assert_eq!(
            plain("foo\r\nbar\u{2028}foo bar", "bar", DisplayMode::LineOnly),
            "[bar]\n\nfoo [bar]\n\n"
        );
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("\n\n"), vec!["", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_no_matches_render_nothing() {
        for mode in [
            DisplayMode::LineOnly,
            DisplayMode::EntireValue,
            DisplayMode::Windowed(3),
        ] {
            assert_eq!(plain("nothing to see", "absent", mode), "");
        }
    }

    #[test]
    fn test_ansi_marker_wraps_match() {
        let pattern = MatchPattern::new("fox", false).unwrap();
        let out = render("quick fox", &pattern, DisplayMode::LineOnly, Marker::Ansi);
        assert!(out.starts_with("quick "));
        assert!(out.contains("fox"));
        assert!(!out.contains("[fox]"));
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(MatchPattern::new("(unclosed", false).is_err());
    }
}
