//! # Slugs
//!
//! URL-safe identifiers derived from titles: lowercase ASCII
//! alphanumerics with single hyphens between words.

/// Derive a slug from free text
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("Rust: a love story!"), "rust-a-love-story");
        assert_eq!(slugify("one -- two"), "one-two");
    }

    #[test]
    fn test_leading_and_trailing_noise() {
        assert_eq!(slugify("  spaced out  "), "spaced-out");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_case_and_digits() {
        assert_eq!(slugify("Top 10 Tips for 2025"), "top-10-tips-for-2025");
    }

    #[test]
    fn test_non_ascii_is_stripped() {
        assert_eq!(slugify("café crème"), "caf-cr-me");
    }
}
