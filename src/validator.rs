// 🛡️ Validator - structural gates on storage-form values
//
// validate_identifier is the only gate the core enforces before a write.
// Free-text fields (name, address, email) are accepted verbatim.

use crate::error::ValidationError;

/// CPF storage form length
pub const IDENTIFIER_LENGTH: usize = 11;

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Succeeds iff `storage_form` is exactly 11 ASCII digits
pub fn validate_identifier(storage_form: &str) -> Result<(), ValidationError> {
    let length = storage_form.chars().count();
    if length == IDENTIFIER_LENGTH && all_digits(storage_form) {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifierLength { length })
    }
}

/// Succeeds iff `storage_form` is 10 (landline) or 11 (mobile) ASCII digits
pub fn validate_phone(storage_form: &str) -> Result<(), ValidationError> {
    let length = storage_form.chars().count();
    if (length == 10 || length == 11) && all_digits(storage_form) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneLength { length })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_length() {
        assert_eq!(
            validate_identifier("1234567890"),
            Err(ValidationError::InvalidIdentifierLength { length: 10 })
        );
        assert!(validate_identifier("12345678901").is_ok());
        assert!(validate_identifier("123456789012").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_identifier_rejects_separators() {
        // Formatted input must be reduced to storage form first
        assert!(validate_identifier("123.456.789-01").is_err());
        assert!(validate_identifier("1234567890a").is_err());
    }

    #[test]
    fn test_phone_length() {
        assert!(validate_phone("1133334444").is_ok());
        assert!(validate_phone("11987654321").is_ok());
        assert_eq!(
            validate_phone("119876"),
            Err(ValidationError::InvalidPhoneLength { length: 6 })
        );
        assert!(validate_phone("(11) 3333-4444").is_err());
    }
}
