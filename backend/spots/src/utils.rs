use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.-]").expect("valid regex"));

static UNDERSCORE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

pub fn sanitize_file_name(input: &str) -> String {
    let s = UNSAFE_CHARS.replace_all(input.trim(), "_");

    UNDERSCORE_RUNS.replace_all(&s, "_").to_lowercase()
}

/// `<timestamp millis>-<sanitized name>`, unique enough for one uploader.
pub fn object_name(timestamp_millis: i64, file_name: &str) -> String {
    format!("{timestamp_millis}-{}", sanitize_file_name(file_name))
}

/// Comma separated line names, trimmed, empties dropped.
pub fn split_lines(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(sanitize_file_name("Tabata.JPG"), "tabata.jpg");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo_1_.png");
        assert_eq!(sanitize_file_name("a-b.c"), "a-b.c");
    }

    #[test]
    fn test_collapses_underscores() {
        assert_eq!(sanitize_file_name("a___b"), "a_b");
        assert_eq!(sanitize_file_name("a _ b"), "a_b");
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(sanitize_file_name("田端大橋.jpg"), "_.jpg");
        assert_eq!(sanitize_file_name("spot_写真_1.jpeg"), "spot_1.jpeg");
    }

    #[test]
    fn test_object_name() {
        assert_eq!(
            object_name(1736512496000, "Shinagawa Bridge.JPG"),
            "1736512496000-shinagawa_bridge.jpg"
        );
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(
            split_lines(" 山手線, 京浜東北線 ,,東海道新幹線 "),
            vec!["山手線", "京浜東北線", "東海道新幹線"]
        );
        assert!(split_lines(" , ").is_empty());
    }
}
