// Field checks shared by the draft types.

use crate::error::CoreError;

pub(crate) fn required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "is required"));
    }
    Ok(())
}

pub(crate) fn email(field: &str, value: &str) -> Result<(), CoreError> {
    let value = value.trim();
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !value.contains(char::is_whitespace)
    });
    if valid {
        Ok(())
    } else {
        Err(CoreError::validation(field, "must be a valid email address"))
    }
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::validation(field, "must be a non-negative number"));
    }
    Ok(())
}

pub(crate) fn within(field: &str, value: f64, min: f64, max: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < min || value > max {
        return Err(CoreError::validation(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_missing() {
        assert!(required("full_name", "  ").is_err());
        assert!(required("full_name", "Ali").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(email("email", "ali@example.uz").is_ok());
        assert!(email("email", "ali@localhost").is_err());
        assert!(email("email", "@example.uz").is_err());
        assert!(email("email", "a li@example.uz").is_err());
    }

    #[test]
    fn ranges() {
        assert!(non_negative("b_cost", -1.0).is_err());
        assert!(within("latitude", 91.0, -90.0, 90.0).is_err());
        assert!(within("latitude", 41.3, -90.0, 90.0).is_ok());
    }
}
