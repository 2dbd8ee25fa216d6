//! 按字宽折行
//!
//! 原文中的换行视为硬换行，每个子行再按单词折行；空行原样保留。
//! 单个单词比可用宽度还长时按字符拆开，保证任何一行都窄于可用宽度。

use crate::infrastructure::font_metrics::Font;

/// 把文本折成不超过 `max_width` 的行
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let fits = |candidate: &str| font.text_width(candidate, size) < max_width;
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let mut words = source_line.split_whitespace().peekable();
        if words.peek().is_none() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if fits(word) {
                current = word.to_string();
            } else {
                let mut pieces = split_word(word, &fits);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// 按字符拆开过长的单词，每段至少一个字符
fn split_word(word: &str, fits: &dyn Fn(&str) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();

    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && !fits(&piece) {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 595.2756 - 80.0;

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_text("1. Define a process. [12 Marks]", Font::Regular, 10.0, WIDTH);
        assert_eq!(lines, vec!["1. Define a process. [12 Marks]"]);
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let text = "Explain in detail the various page replacement algorithms ".repeat(12);
        let lines = wrap_text(&text, Font::Regular, 10.0, WIDTH);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Regular.text_width(line, 10.0) < WIDTH, "过宽: {}", line);
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined.split_whitespace().count(), text.split_whitespace().count());
    }

    #[test]
    fn test_hard_newlines_and_blank_lines_are_kept() {
        let lines = wrap_text("Explain:\n\na) TCP\nb)   UDP", Font::Regular, 10.0, WIDTH);
        assert_eq!(lines, vec!["Explain:", "", "a) TCP", "b) UDP"]);
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "W".repeat(200);
        let lines = wrap_text(&format!("see {}", word), Font::Regular, 10.0, 100.0);
        assert_eq!(lines[0], "see");
        assert!(lines.len() > 2);
        assert!(lines.iter().all(|l| Font::Regular.text_width(l, 10.0) < 100.0));
        assert_eq!(lines[1..].concat(), word);
    }
}
