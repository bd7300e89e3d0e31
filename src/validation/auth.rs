/// Validates a password's length.
///
/// Used as a `garde` custom rule so the message matches what the form shows.
pub fn validate_password(password: &str, _ctx: &()) -> garde::Result {
    if password.chars().count() < 8 {
        return Err(garde::Error::new("Password must be at least 8 characters long"));
    }

    if password.len() > 128 {
        return Err(garde::Error::new("Password must be at most 128 characters"));
    }

    Ok(())
}

/// Validates a person's name: non-blank and of reasonable length.
pub fn validate_name(name: &str, _ctx: &()) -> garde::Result {
    if name.trim().is_empty() {
        return Err(garde::Error::new("Name cannot be empty"));
    }

    if name.len() > 200 {
        return Err(garde::Error::new("Name must be at most 200 characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_bounds() {
        assert!(validate_password("short", &()).is_err());
        assert!(validate_password("longenough", &()).is_ok());
        assert!(validate_password(&"x".repeat(129), &()).is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("   ", &()).is_err());
        assert!(validate_name("Jane", &()).is_ok());
    }
}
