/// Width-aware string helpers for fixed-width terminal cells.
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Crop `s` to at most `max` display columns by replacing its middle with
/// `...`. Paths keep their most telling parts this way: the root and the
/// file name.
pub fn crop_str(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return ".".repeat(max);
    }
    let budget = max - 3;
    let head_budget = budget / 2;
    let tail_budget = budget - head_budget;

    let mut head = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > head_budget {
            break;
        }
        head.push(ch);
        used += w;
    }

    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for ch in s.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > tail_budget {
            break;
        }
        tail.push(ch);
        used += w;
    }
    tail.reverse();

    let mut out = head;
    out.push_str("...");
    out.extend(tail);
    out
}

/// Left-align `s` in exactly `width` columns, cropping if needed.
pub fn fit_str(s: &str, width: usize) -> String {
    let cropped = crop_str(s, width);
    let pad = width.saturating_sub(cropped.width());
    format!("{cropped}{}", " ".repeat(pad))
}
