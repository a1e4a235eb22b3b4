use super::error::DomainError;

/// Lowercases ASCII alphanumerics and folds every run of other characters
/// into a single hyphen. Leading and trailing hyphens are dropped.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Returns the explicit slug when one was supplied, otherwise derives it from
/// `source`. Either way the result must be non-empty and within `max_len`.
pub(crate) fn resolve_slug(
    explicit: Option<&str>,
    source: &str,
    max_len: usize,
) -> Result<String, DomainError> {
    let slug = match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => {
            if !is_valid_slug(value) {
                return Err(DomainError::Validation {
                    field: "slug",
                    message: "must contain only lowercase letters, digits and hyphens",
                });
            }
            value.to_string()
        }
        None => slugify(source),
    };

    if slug.is_empty() {
        return Err(DomainError::Validation {
            field: "slug",
            message: "could not be derived, provide one explicitly",
        });
    }
    if slug.len() > max_len {
        return Err(DomainError::Validation {
            field: "slug",
            message: "is too long",
        });
    }
    Ok(slug)
}

pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_slug, resolve_slug, slugify};
    use crate::domain::error::DomainError;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn slugify_collapses_runs_and_trims_edges() {
        assert_eq!(slugify("  --Rust  &  Axum!!  "), "rust-axum");
        assert_eq!(slugify("a___b...c"), "a-b-c");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn resolve_slug_prefers_explicit_value() {
        let slug = resolve_slug(Some("custom-slug"), "Some Title", 200).expect("must resolve");
        assert_eq!(slug, "custom-slug");
    }

    #[test]
    fn resolve_slug_derives_when_explicit_is_blank() {
        let slug = resolve_slug(Some("   "), "Some Title", 200).expect("must resolve");
        assert_eq!(slug, "some-title");
    }

    #[test]
    fn resolve_slug_rejects_malformed_explicit_value() {
        let err = resolve_slug(Some("Not A Slug"), "title", 200).expect_err("must fail");
        assert!(matches!(err, DomainError::Validation { field: "slug", .. }));
    }

    #[test]
    fn resolve_slug_rejects_underivable_title() {
        let err = resolve_slug(None, "???", 200).expect_err("must fail");
        assert!(matches!(err, DomainError::Validation { field: "slug", .. }));
    }

    #[test]
    fn valid_slug_shape() {
        assert!(is_valid_slug("hello-world-2"));
        assert!(!is_valid_slug("-hello"));
        assert!(!is_valid_slug("Hello"));
    }
}
