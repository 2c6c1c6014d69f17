//! Slug derivation shared by news and categories.
//!
//! A base slug is derived from free text (title or name) and made unique by
//! probing the store with `-1`, `-2`, ... suffixes.

use std::future::Future;

use crate::core::error::Result;
use crate::shared::constants::{MAX_SLUG_LENGTH, SLUG_SUFFIX_RESERVE};

/// Derive a URL-safe base slug from `text`.
///
/// Non-ASCII characters are transliterated ("Título" -> "titulo"). When nothing
/// sluggable is left, `fallback` is returned so the result is never empty.
pub fn base_slug(text: &str, fallback: &str) -> String {
    let slug = ::slug::slugify(text);

    let max = MAX_SLUG_LENGTH - SLUG_SUFFIX_RESERVE;
    let slug = if slug.len() > max {
        // slugify output is ASCII, so byte slicing is on a char boundary
        slug[..max].trim_end_matches('-').to_string()
    } else {
        slug
    };

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Find the first free slug among `base`, `base-1`, `base-2`, ...
///
/// `exists` is asked about each candidate in turn and must consider every
/// record, including soft-deleted ones.
pub async fn unique_slug<F, Fut>(base: &str, mut exists: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut slug = base.to_string();
    let mut counter: u32 = 1;

    while exists(slug.clone()).await? {
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base_slug_from_title() {
        assert_eq!(base_slug("Test News", "news"), "test-news");
        assert_eq!(base_slug("  Hello,   World!  ", "news"), "hello-world");
        assert_eq!(base_slug("Título de la Novedad", "news"), "titulo-de-la-novedad");
    }

    #[test]
    fn test_base_slug_falls_back_when_empty() {
        assert_eq!(base_slug("", "news"), "news");
        assert_eq!(base_slug("!!! ???", "category"), "category");
    }

    #[test]
    fn test_base_slug_is_truncated() {
        let title = "word ".repeat(100);
        let slug = base_slug(&title, "news");

        assert!(slug.len() <= MAX_SLUG_LENGTH - SLUG_SUFFIX_RESERVE);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[tokio::test]
    async fn test_unique_slug_returns_base_when_free() {
        let slug = unique_slug("test-news", |_| async { Ok(false) })
            .await
            .unwrap();

        assert_eq!(slug, "test-news");
    }

    #[tokio::test]
    async fn test_unique_slug_appends_counter() {
        let taken: HashSet<String> = ["test-news", "test-news-1", "test-news-2"]
            .into_iter()
            .map(String::from)
            .collect();

        let slug = unique_slug("test-news", |candidate| {
            let hit = taken.contains(&candidate);
            async move { Ok(hit) }
        })
        .await
        .unwrap();

        assert_eq!(slug, "test-news-3");
    }
}
