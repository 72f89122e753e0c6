//! Field rules shared by the per-step schemas.
//!
//! Every rule is a pure function over the raw text a user typed. Schemas call
//! them in order and record the first failing message per field.

use chrono::NaiveDate;

use crate::errors::FieldErrors;

/// Characters accepted as the "special" class in account passwords
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Trimmed value, or `None` when blank
pub fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Required text field
pub fn required(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> Option<String> {
    match present(value) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, message);
            None
        }
    }
}

/// Required, strictly positive number
pub fn positive_number(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    required_message: &str
) -> Option<f64> {
    positive_number_with(errors, field, value, required_message, "Must be a positive number")
}

/// [`positive_number`] with a custom message for zero and negative values
pub fn positive_number_with(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    required_message: &str,
    positive_message: &str
) -> Option<f64> {
    let raw = match present(value) {
        Some(raw) => raw,
        None => {
            errors.add(field, required_message);
            return None;
        }
    };
    match raw.parse::<f64>() {
        Ok(n) if !n.is_finite() => {
            errors.add(field, "Must be a number");
            None
        }
        Ok(n) if n <= 0.0 => {
            errors.add(field, positive_message);
            None
        }
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, "Must be a number");
            None
        }
    }
}

/// Minimum length in characters, applied to an already-present value
pub fn min_len(errors: &mut FieldErrors, field: &str, value: &str, min: usize, message: &str) -> bool {
    if value.chars().count() < min {
        errors.add(field, message);
        false
    } else {
        true
    }
}

/// Loose structural email check: one `@`, non-empty local part, dotted domain
pub fn is_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn email(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    let value = required(errors, field, value, "Email is required")?;
    if !is_email(&value) {
        errors.add(field, "Invalid email address");
        return None;
    }
    Some(value)
}

/// Letters and spaces only
pub fn is_alphabetic_name(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphabetic() || c == ' ')
}

/// At least one lowercase, uppercase, digit and special character, and
/// nothing outside those classes
pub fn is_strong_password(value: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    value.chars().any(|c| c.is_ascii_lowercase()) &&
        value.chars().any(|c| c.is_ascii_uppercase()) &&
        value.chars().any(|c| c.is_ascii_digit()) &&
        value.chars().any(|c| PASSWORD_SPECIALS.contains(c)) &&
        value.chars().all(allowed)
}

/// `YYYY-MM-DD`
pub fn date(errors: &mut FieldErrors, field: &str, value: &str, required_message: &str) -> Option<NaiveDate> {
    let raw = required(errors, field, value, required_message)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Must be a valid date (YYYY-MM-DD)");
            None
        }
    }
}

/// Land survey number: `LS` followed by four digits, `/`, four digits
pub fn is_ls_number(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 11 &&
        bytes.starts_with(b"LS") &&
        bytes[2..6].iter().all(u8::is_ascii_digit) &&
        bytes[6] == b'/' &&
        bytes[7..].iter().all(u8::is_ascii_digit)
}

/// `"lat, lng"` into a pair, rejecting out-of-range values
pub fn parse_coordinates(value: &str) -> Option<(f64, f64)> {
    let mut parts = value.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_number_messages() {
        let mut errors = FieldErrors::new();
        assert_eq!(positive_number(&mut errors, "size", "-5", "Size is required"), None);
        assert_eq!(errors.get("size"), Some("Must be a positive number"));

        let mut errors = FieldErrors::new();
        assert_eq!(positive_number(&mut errors, "size", "  ", "Size is required"), None);
        assert_eq!(errors.get("size"), Some("Size is required"));

        let mut errors = FieldErrors::new();
        assert_eq!(positive_number(&mut errors, "size", "500", "Size is required"), Some(500.0));
        assert!(errors.is_empty());
    }

    #[test]
    fn ls_number_format() {
        assert!(is_ls_number("LS1234/2024"));
        assert!(!is_ls_number("LS123/2024"));
        assert!(!is_ls_number("ls1234/2024"));
        assert!(!is_ls_number("LS1234-2024"));
        assert!(!is_ls_number("LS1234/20245"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.com"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.com"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("a@@b.com"));
    }

    #[test]
    fn password_strength() {
        assert!(is_strong_password("Secret1!"));
        assert!(!is_strong_password("secret1!"));
        assert!(!is_strong_password("Secret11"));
        assert!(!is_strong_password("Secret1#"));
    }

    #[test]
    fn coordinates_round_values() {
        assert_eq!(parse_coordinates("8.4657, -13.2317"), Some((8.4657, -13.2317)));
        assert_eq!(parse_coordinates("8.4657"), None);
        assert_eq!(parse_coordinates("95, 10"), None);
    }
}
