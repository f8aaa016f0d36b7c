use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` down to at most `max_cells` cells on a grapheme boundary, ending
/// with `…` when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = display_width(grapheme);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    out.push('\u{2026}');
    out
}

/// Right-pad with spaces to `cells` display cells. Wider strings are
/// returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let width = display_width(s);
    if width >= cells {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(cells - width))
}

/// First line of a possibly multi-line text, marked with `…` when more
/// lines follow
pub fn first_line(s: &str) -> String {
    let mut lines = s.lines();
    let first = lines.next().unwrap_or("");
    if lines.next().is_some() {
        format!("{}\u{2026}", first)
    } else {
        first.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk_and_emoji() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("🎉"), 2);
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_to_width("hello world", 8), "hello w\u{2026}");
        assert_eq!(truncate_to_width("hi", 10), "hi");
    }

    #[test]
    fn truncate_cjk_boundary() {
        assert_eq!(truncate_to_width("你好世界", 5), "你好\u{2026}");
    }

    #[test]
    fn truncate_keeps_combining_marks_together() {
        let s = "cafe\u{0301} latte";
        assert_eq!(truncate_to_width(s, 5), "cafe\u{0301}\u{2026}");
    }

    #[test]
    fn pad_counts_cells_not_bytes() {
        assert_eq!(pad_to_width("你", 4), "你  ");
        assert_eq!(pad_to_width("abc", 2), "abc");
    }

    #[test]
    fn first_line_marks_more() {
        assert_eq!(first_line("one"), "one");
        assert_eq!(first_line("one\ntwo"), "one\u{2026}");
        assert_eq!(first_line(""), "");
    }
}
