use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const ELLIPSIS: char = '…';

/// Two pseudo-random values in `[-1, 1]` derived from the id only, so every
/// load of the same data produces the same jitter.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Stable value in `[0, 1]` for an id.
pub fn stable_unit(id: &str) -> f32 {
    let (x, _) = stable_pair(id);
    ((x + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Cuts `label` to at most `max_chars` characters, the last one being an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut truncated = label.chars().take(max_chars - 1).collect::<String>();
    truncated.push(ELLIPSIS);
    truncated
}

pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_repeatable_and_bounded() {
        let first = stable_pair("billet:alembic");
        let second = stable_pair("billet:alembic");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
        assert!((0.0..=1.0).contains(&stable_unit("billet:alembic")));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_label("Athanor", 20), "Athanor");
        assert_eq!(truncate_label("Feu humain éternel", 6), "Feu h…");
        assert_eq!(truncate_label("abc", 0), "");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_xml(r#"<a & "b" 'c'>"#),
            "&lt;a &amp; &quot;b&quot; &#39;c&#39;&gt;"
        );
    }
}
