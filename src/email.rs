//! Email normalization for user accounts.

/// Lowercase the domain portion of an email, leaving the local part as
/// submitted. `"Test@Example.COM"` becomes `"Test@example.com"`.
///
/// Returns `None` for an empty address or one without an `@`.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return None;
    }

    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    Some(format!("{}@{}", local, domain.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased() {
        let cases = [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.com", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.COM", "test4@example.com"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_email(input).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_local_part_preserved() {
        assert_eq!(
            normalize_email("MixedCase@domain.org").as_deref(),
            Some("MixedCase@domain.org")
        );
    }

    #[test]
    fn test_empty_email_rejected() {
        assert_eq!(normalize_email(""), None);
        assert_eq!(normalize_email("   "), None);
    }

    #[test]
    fn test_malformed_email_rejected() {
        assert_eq!(normalize_email("no-at-sign"), None);
        assert_eq!(normalize_email("@example.com"), None);
        assert_eq!(normalize_email("user@"), None);
    }
}
