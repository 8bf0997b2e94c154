use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width characters.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .take_while(|ch| unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .take(1)
            .collect();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        let t = truncate_display(s, width);
        let tw = display_width(&t);
        format!("{}{}", t, " ".repeat(width.saturating_sub(tw)))
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Widest entry, capped.
pub(crate) fn column_width<'a>(items: impl IntoIterator<Item = &'a str>, min: usize, max: usize) -> usize {
    items
        .into_iter()
        .map(display_width)
        .max()
        .unwrap_or(0)
        .clamp(min, max)
}

/// One glyph per heat band, for terminal heat strips.
pub(crate) fn heat_glyph(heat: f64) -> char {
    if heat >= 0.9 {
        '█'
    } else if heat >= docdrift_engine::matrix::HIGH_RISK {
        '▓'
    } else if heat >= docdrift_engine::matrix::MEDIUM_RISK {
        '▒'
    } else {
        '·'
    }
}
