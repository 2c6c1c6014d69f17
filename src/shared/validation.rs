use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs supplied by editors
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "test-news", "news-2024", "a"
    /// - Invalid: "-news", "news-", "news--today", "News", "news_today"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("test-news"));
        assert!(SLUG_REGEX.is_match("test-news-1"));
        assert!(SLUG_REGEX.is_match("news2024"));
        assert!(SLUG_REGEX.is_match("a"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-news")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("news-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("news--today")); // double hyphen
        assert!(!SLUG_REGEX.is_match("News")); // uppercase
        assert!(!SLUG_REGEX.is_match("news_today")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("test news")); // space
    }
}
