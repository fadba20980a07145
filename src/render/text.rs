//! Label wrapping.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Wrap `text` into lines of at most `max_width` display columns.
///
/// Breaks at spaces when one fits, otherwise mid-word. Runs of whitespace
/// collapse to a single space. A zero width disables wrapping.
pub fn wrap(text: &str, max_width: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if max_width == 0 || normalized.width() <= max_width {
        return vec![normalized];
    }

    let mut lines = Vec::new();
    let mut remaining = normalized.as_str();

    while !remaining.is_empty() {
        if remaining.width() <= max_width {
            lines.push(remaining.to_string());
            break;
        }

        let mut break_at = 0;
        let mut last_space = None;
        let mut used = 0;
        for (idx, ch) in remaining.char_indices() {
            let w = ch.width().unwrap_or(0);
            if ch == ' ' && used <= max_width {
                last_space = Some(idx);
            }
            if used + w > max_width {
                break;
            }
            used += w;
            break_at = idx + ch.len_utf8();
        }

        let split = match last_space {
            Some(sp) if sp > 0 => sp,
            _ if break_at > 0 => break_at,
            // a single glyph wider than the line
            _ => remaining
                .char_indices()
                .nth(1)
                .map_or(remaining.len(), |(idx, _)| idx),
        };

        let (line, rest) = remaining.split_at(split);
        lines.push(line.trim_end().to_string());
        remaining = rest.trim_start();
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap("kitchen_0", 13), vec!["kitchen_0"]);
    }

    #[test]
    fn breaks_at_spaces() {
        assert_eq!(wrap("put the apple in the fridge", 10), vec!["put the", "apple in", "the fridge"]);
    }

    #[test]
    fn space_right_after_full_line_is_used() {
        assert_eq!(wrap("Hello World", 5), vec!["Hello", "World"]);
    }

    #[test]
    fn long_ids_break_mid_word() {
        assert_eq!(wrap("living_room_bench_12", 10), vec!["living_roo", "m_bench_12"]);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(wrap("  a   b  ", 10), vec!["a b"]);
    }

    #[test]
    fn zero_width_disables_wrapping() {
        assert_eq!(wrap("abc def", 0), vec!["abc def"]);
        assert_eq!(wrap("", 5), vec![""]);
    }
}
