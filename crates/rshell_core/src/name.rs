//! Case-insensitive name comparison.
//!
//! Variable names, parameter names, aliases, drive names and scope
//! qualifiers are all compared without regard to case. Every table in the
//! engine keys on the folded form produced here so that lookups agree.

use std::borrow::Cow;

/// Fold a name to the form used as a map key.
///
/// ASCII names (the overwhelmingly common case) are lowered in place without
/// consulting the Unicode tables.
#[inline]
pub fn fold_name(name: &str) -> Cow<'_, str> {
    if name.is_ascii() {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    } else {
        Cow::Owned(name.to_lowercase())
    }
}

/// Whether two names are equal ignoring case.
#[inline]
pub fn names_equal(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        fold_name(a) == fold_name(b)
    }
}

/// Whether `prefix` is a case-insensitive prefix of `name`.
pub fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    if name.is_ascii() && prefix.is_ascii() {
        name.len() >= prefix.len() && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    } else {
        fold_name(name).starts_with(fold_name(prefix).as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_borrows_lowercase_ascii() {
        assert!(matches!(fold_name("path"), Cow::Borrowed("path")));
        assert_eq!(fold_name("Path"), "path");
        assert_eq!(fold_name("ÄRGER"), "ärger");
    }

    #[test]
    fn test_names_equal() {
        assert!(names_equal("ErrorAction", "erroraction"));
        assert!(!names_equal("Force", "Forced"));
        assert!(names_equal("Größe", "GRÖßE"));
    }

    #[test]
    fn test_prefix_match() {
        assert!(starts_with_ignore_case("Format", "fo"));
        assert!(starts_with_ignore_case("Format", "FORMAT"));
        assert!(!starts_with_ignore_case("Fo", "Format"));
        assert!(starts_with_ignore_case("Anything", ""));
    }
}
