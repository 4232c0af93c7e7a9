use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Row separating report sections.
pub const DIVIDER: &str = "---------------------------------------";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

pub fn format_gigabytes(bytes: u64) -> String {
    format!("{:.2} GB", gigabytes(bytes))
}

/// Cuts `s` to at most `max_width` display columns, marking the cut with an
/// ellipsis.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_owned();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out: String = s
        .chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    if max_width > 0 {
        out.push('\u{2026}');
    }
    out
}

/// Left-aligns `s` in a column `width` display columns wide. Wider strings
/// are returned unchanged.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    let mut out = String::with_capacity(s.len() + fill);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gigabytes_use_binary_units() {
        assert_eq!(format_gigabytes(0), "0.00 GB");
        assert_eq!(format_gigabytes(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_gigabytes(1536 * 1024 * 1024), "1.50 GB");
    }

    #[test]
    fn truncation_counts_display_columns() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("example.org", 8), "example\u{2026}");
        assert_eq!(truncate_to_width("日本語ホスト", 5), "日本\u{2026}");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn padding_counts_display_columns() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日本", 5), "日本 ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }
}
