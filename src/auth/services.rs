use lazy_static::lazy_static;
use regex::Regex;

use super::extractors::AuthUser;
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Self-service routes only act on the caller's own account.
pub(crate) fn ensure_owner(auth: &AuthUser, email: &str) -> Result<(), AppError> {
    if auth.0 != email {
        tracing::warn!(authenticated = %auth.0, requested = %email, "identity mismatch");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("alice@x.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice @x.com"));
        assert!(!is_valid_email("alice@localhost"));
    }

    #[test]
    fn owner_check_compares_exact_email() {
        let auth = AuthUser("alice@x.com".into());
        assert!(ensure_owner(&auth, "alice@x.com").is_ok());
        assert!(matches!(
            ensure_owner(&auth, "bob@x.com"),
            Err(AppError::Unauthorized)
        ));
    }
}
