/// Cuts `value` to at most `max_chars` characters, appending `...` when
/// anything was dropped.
pub fn truncate_with_ellipsis(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        None => value.to_string(),
        Some((end, _)) => format!("{}...", &value[..end]),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_with_ellipsis;

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("", 3), "");
    }

    #[test]
    fn long_values_are_cut_and_marked() {
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
    }

    #[test]
    fn does_not_split_multibyte_chars() {
        assert_eq!(truncate_with_ellipsis("aéé", 2), "aé...");
    }
}
