// src/tracking/sanitize.rs
//! Per-property sanitization
//!
//! Every string property goes through [`sanitize`] before it leaves the
//! tracker. Lengths are counted in characters and truncation never splits a
//! character.

/// Maximum length of `inner_text`
pub const MAX_TEXT_LENGTH: usize = 128;

/// Maximum length of every other string property
pub const MAX_PROP_LENGTH: usize = 1024;

/// String properties of a tracking record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    TagName,
    ClassName,
    Id,
    Href,
    InnerText,
    EventType,
}

impl Prop {
    /// Wire key of the property
    pub fn key(&self) -> &'static str {
        match self {
            Prop::TagName => "tag_name",
            Prop::ClassName => "class_name",
            Prop::Id => "id",
            Prop::Href => "href",
            Prop::InnerText => "inner_text",
            Prop::EventType => "type",
        }
    }

    /// Character cap applied to this property
    pub fn max_length(&self) -> usize {
        match self {
            Prop::InnerText => MAX_TEXT_LENGTH,
            _ => MAX_PROP_LENGTH,
        }
    }
}

/// Sanitize a raw property value.
///
/// Class names longer than the cap lose their last, possibly clipped, token
/// so that no class is reported half-cut.
pub fn sanitize(prop: Prop, value: &str) -> String {
    let max = prop.max_length();

    match truncate_chars(value, max) {
        None => value.to_string(),
        Some(clipped) if prop == Prop::ClassName => match clipped.rfind(' ') {
            Some(idx) => clipped[..idx].to_string(),
            None => String::new(),
        },
        Some(clipped) => clipped.to_string(),
    }
}

/// Returns the first `max` characters of `value`, or `None` if it already fits
fn truncate_chars(value: &str, max: usize) -> Option<&str> {
    value
        .char_indices()
        .nth(max)
        .map(|(byte_idx, _)| &value[..byte_idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_values_untouched() {
        assert_eq!(sanitize(Prop::ClassName, "btn primary"), "btn primary");
        assert_eq!(sanitize(Prop::InnerText, "Go"), "Go");
        assert_eq!(sanitize(Prop::Href, ""), "");
    }

    #[test]
    fn test_inner_text_hard_truncate() {
        let text = "x".repeat(200);
        let sanitized = sanitize(Prop::InnerText, &text);
        assert_eq!(sanitized.chars().count(), MAX_TEXT_LENGTH);
    }

    #[test]
    fn test_general_prop_hard_truncate() {
        let href = format!("https://example.com/{}", "a".repeat(2000));
        let sanitized = sanitize(Prop::Href, &href);
        assert_eq!(sanitized.chars().count(), MAX_PROP_LENGTH);
        assert!(href.starts_with(&sanitized));
    }

    #[test]
    fn test_class_name_drops_clipped_token() {
        // 1100 "a" characters with a space every 10 characters
        let class_name: String = (0..1100)
            .map(|i| if i % 10 == 9 { ' ' } else { 'a' })
            .collect();

        let sanitized = sanitize(Prop::ClassName, &class_name);
        assert!(sanitized.chars().count() <= MAX_PROP_LENGTH);
        assert!(sanitized.ends_with("aaaaaaaaa"));
        assert!(sanitized.split(' ').all(|token| token.len() == 9));
        assert!(class_name.starts_with(&sanitized));
    }

    #[test]
    fn test_class_name_without_spaces_is_emptied() {
        let class_name = "a".repeat(1500);
        assert_eq!(sanitize(Prop::ClassName, &class_name), "");
    }

    #[test]
    fn test_multibyte_truncation() {
        let text = "é".repeat(300);
        let sanitized = sanitize(Prop::InnerText, &text);
        assert_eq!(sanitized.chars().count(), MAX_TEXT_LENGTH);
    }

    #[test]
    fn test_prop_keys() {
        assert_eq!(Prop::EventType.key(), "type");
        assert_eq!(Prop::InnerText.max_length(), 128);
        assert_eq!(Prop::Id.max_length(), 1024);
    }

    fn any_prop() -> impl Strategy<Value = Prop> {
        prop_oneof![
            Just(Prop::TagName),
            Just(Prop::ClassName),
            Just(Prop::Id),
            Just(Prop::Href),
            Just(Prop::InnerText),
            Just(Prop::EventType),
        ]
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(prop in any_prop(), value in "[a-z ]{0,1500}") {
            let once = sanitize(prop, &value);
            let twice = sanitize(prop, &once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_sanitize_respects_cap(prop in any_prop(), value in "\\PC{0,1500}") {
            let sanitized = sanitize(prop, &value);
            prop_assert!(sanitized.chars().count() <= prop.max_length());
            prop_assert!(value.starts_with(&sanitized));
        }

        #[test]
        fn prop_class_name_never_splits_token(value in "[a-z]{1,12}( [a-z]{1,12}){80,160}") {
            let sanitized = sanitize(Prop::ClassName, &value);
            if value.chars().count() > MAX_PROP_LENGTH && !sanitized.is_empty() {
                // The character after the kept prefix must be a token boundary
                prop_assert_eq!(value[sanitized.len()..].chars().next(), Some(' '));
            } else if value.chars().count() <= MAX_PROP_LENGTH {
                prop_assert_eq!(sanitized, value);
            }
        }
    }
}
