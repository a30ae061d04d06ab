//! Pure text helpers: word-aware truncation and permalink slugs.
//!
//! Lengths are counted in `char`s, not bytes, so multi-byte titles are never split
//! inside a code point.

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Shorten `text` to at most `max_len` characters, cutting on word boundaries.
///
/// Text that already fits is returned untouched. Otherwise whole words are kept while
/// they fit in front of the [`ELLIPSIS`]; a first word that is too long on its own is
/// hard-cut. Bounds smaller than the ellipsis leave no room and yield `""`.
///
/// ```
/// use elixirstatus_publisher::text::truncate;
///
/// assert_eq!(truncate("Phoenix 1.0 released", 40), "Phoenix 1.0 released");
/// assert_eq!(truncate("Phoenix 1.0 released today", 18), "Phoenix 1.0...");
/// assert_eq!(truncate("Supercalifragilistic", 8), "Super...");
/// assert_eq!(truncate("anything", 2), "");
/// ```
pub fn truncate(text: &str, max_len: usize) -> String {
    if char_len(text) <= max_len {
        return text.to_string();
    }
    let Some(budget) = max_len.checked_sub(char_len(ELLIPSIS)) else {
        return String::new();
    };

    let mut out = String::new();
    let mut out_len = 0usize;
    for word in text.split_whitespace() {
        let word_len = char_len(word);
        let needed = if out.is_empty() {
            word_len
        } else {
            out_len + 1 + word_len
        };
        if needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        out_len = needed;
    }

    if out.is_empty() {
        let first = text.split_whitespace().next().unwrap_or_default();
        out = first.chars().take(budget).collect();
    }
    out.push_str(ELLIPSIS);
    out
}

/// Lowercase `title` and reduce it to `[a-z0-9-]`, words joined by single hyphens.
///
/// ```
/// use elixirstatus_publisher::text::slugify;
///
/// assert_eq!(slugify("Ecto 2.0: What's new?"), "ecto-20-whats-new");
/// assert_eq!(slugify("  Rust & Elixir  "), "rust-elixir");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for word in title.split_whitespace() {
        let cleaned: String = word
            .to_lowercase()
            .chars()
            .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
            .collect();
        for part in cleaned.split('-').filter(|p| !p.is_empty()) {
            if !slug.is_empty() {
                slug.push('-');
            }
            slug.push_str(part);
        }
    }
    slug
}

/// Build `"{uid}-{slug}"` for a posting. No title means no permalink.
///
/// ```
/// use elixirstatus_publisher::text::permalink;
///
/// assert_eq!(
///     permalink("aB87", Some("I really like this TiTlE")).as_deref(),
///     Some("aB87-i-really-like-this-title")
/// );
/// assert_eq!(permalink("aB87", None), None);
/// ```
pub fn permalink(uid: &str, title: Option<&str>) -> Option<String> {
    let slug = slugify(title?);
    if slug.is_empty() {
        Some(uid.to_string())
    } else {
        Some(format!("{uid}-{slug}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_text_that_fits() {
        assert_eq!(truncate("", 0), "");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
    }

    #[test]
    fn cuts_on_word_boundary() {
        let title = "Announcing the new Elixir release with many improvements";
        assert_eq!(truncate(title, 30), "Announcing the new Elixir...");
        assert_eq!(truncate(title, 29), "Announcing the new Elixir...");
        assert_eq!(truncate(title, 28), "Announcing the new Elixir...");
        assert_eq!(truncate(title, 27), "Announcing the new...");
    }

    #[test]
    fn hard_cuts_a_single_long_word() {
        assert_eq!(truncate("Supercalifragilistic expialidocious", 10), "Superca...");
    }

    #[test]
    fn tiny_bounds_have_no_room() {
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("hello", 2), "");
        assert_eq!(truncate("hello", 3), "...");
        assert_eq!(truncate("hello", 4), "h...");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(truncate("über straße", 11), "über straße");
        assert_eq!(truncate("überstraßenbahn", 7), "über...");
    }

    #[test]
    fn collapses_whitespace_only_when_cutting() {
        assert_eq!(truncate("a   b", 5), "a   b");
        assert_eq!(truncate("a   b   c   d", 8), "a b c...");
    }

    #[test]
    fn permalink_examples() {
        assert_eq!(
            permalink("aB87", Some("I really like this TiTlE")).as_deref(),
            Some("aB87-i-really-like-this-title")
        );
        assert_eq!(permalink("x1", Some("v1.4 -- released!")).as_deref(), Some("x1-v14-released"));
        assert_eq!(permalink("x1", Some("!!!")).as_deref(), Some("x1"));
        assert_eq!(permalink("x1", None), None);
    }

    #[test]
    fn slug_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Ünïcode"), "caf-ncode");
        assert_eq!(slugify("tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    proptest! {
        #[test]
        fn truncation_respects_bound(text in "\\PC{0,200}", max_len in 3usize..160) {
            prop_assert!(truncate(&text, max_len).chars().count() <= max_len);
        }

        #[test]
        fn truncation_is_identity_when_text_fits(text in "\\PC{0,60}", extra in 0usize..20) {
            let max_len = text.chars().count() + extra;
            prop_assert_eq!(truncate(&text, max_len), text.clone());
        }

        #[test]
        fn truncation_of_truncation_is_stable(text in "[a-z ]{0,120}", max_len in 3usize..80) {
            let once = truncate(&text, max_len);
            prop_assert_eq!(truncate(&once, max_len), once.clone());
        }

        #[test]
        fn slug_uses_allowed_charset(title in "\\PC{0,120}") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-')));
            prop_assert!(!slug.contains("--"));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }

        #[test]
        fn permalink_is_uid_prefixed(uid in "[A-Za-z0-9]{1,8}", title in "\\PC{0,60}") {
            let link = permalink(&uid, Some(&title)).unwrap();
            prop_assert!(link.starts_with(&uid));
        }
    }
}
