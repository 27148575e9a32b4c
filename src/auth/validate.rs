//! Field validators for user-facing forms. Each returns `Some(message)` on
//! failure so callers can collect them into an error list.

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;

pub fn validate_name(name: &str) -> Option<String> {
    validate_required(name, "Name", MAX_NAME_LEN)
}

/// Must contain a local part, an '@' and a dotted domain; max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Some("Email must be a valid address".to_string());
    }
    None
}

pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("a@b.co").is_none());
        assert!(validate_email("").is_some());
        assert!(validate_email("no-at.example.com").is_some());
        assert!(validate_email("@example.com").is_some());
        assert!(validate_email("a@localhost").is_some());
        assert!(validate_email("a@b@c.com").is_some());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("12345").is_some());
        assert!(validate_password("123456").is_none());
    }

    #[test]
    fn required_and_optional_fields() {
        assert_eq!(validate_required("  ", "Title", 10), Some("Title is required".to_string()));
        assert!(validate_required("abcdefghijk", "Title", 10).is_some());
        assert!(validate_optional("", "Description", 10).is_none());
        assert!(validate_optional("abcdefghijk", "Description", 10).is_some());
    }
}
