// 🪪 Record - the unit of storage
//
// Storage invariants:
// - id is exactly 11 digits, no separators
// - phone is digits only (10 or 11 when built from a draft)
// - income is finite and >= 0
//
// Display forms are derived on demand and never stored.

use crate::classifier::{classify, tier_label, IncomeTier, TierLabel};
use crate::error::IntakeError;
use crate::formatter::{format_identifier, format_phone, to_storage_form};
use crate::validator::{validate_identifier, validate_phone};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Date layout of the register form's date input
pub const DRAFT_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// CPF, storage form
    pub id: String,
    pub name: String,
    /// Mother's name
    pub guardian_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub email: String,
    /// Storage form
    pub phone: String,
    /// Monthly income in BRL
    pub income: f64,
}

impl Record {
    pub fn tier(&self) -> IncomeTier {
        classify(self.income)
    }

    pub fn tier_label(&self) -> TierLabel {
        tier_label(self.tier())
    }

    pub fn display_identifier(&self) -> String {
        format_identifier(&self.id)
    }

    pub fn display_phone(&self) -> String {
        format_phone(&self.phone)
    }
}

// ============================================================================
// RECORD DRAFT (raw register-form input)
// ============================================================================

/// The register form exactly as typed: every field is raw text.
///
/// `to_record` applies the caller-side preconditions (required fields,
/// parseable date and income) plus the CPF gate, and produces storage forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub cpf: String,
    pub name: String,
    pub guardian_name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub income: String,
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, IntakeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(IntakeError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Exact decimal for an income value, built from its shortest `f64`
/// representation so `1.005` stays `1.005` instead of `1.00499999...`.
///
/// `None` when the magnitude is beyond what `Decimal` holds (about 7.9e28).
pub fn income_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// Parse a decimal amount; accepts `1234.56` and `1234,56`
pub fn parse_income(raw: &str) -> Result<f64, IntakeError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| IntakeError::InvalidIncome(raw.to_string()))?;

    if value < 0.0 || income_decimal(value).is_none() {
        return Err(IntakeError::InvalidIncome(raw.to_string()));
    }
    Ok(value)
}

impl RecordDraft {
    pub fn to_record(&self) -> Result<Record, IntakeError> {
        // Required fields, in form order
        require(&self.name, "name")?;
        require(&self.guardian_name, "guardian_name")?;
        require(&self.cpf, "cpf")?;
        let birth_date = require(&self.birth_date, "birth_date")?;
        require(&self.address, "address")?;
        require(&self.email, "email")?;
        require(&self.phone, "phone")?;
        let income = require(&self.income, "income")?;

        let id = to_storage_form(&self.cpf);
        validate_identifier(&id)?;

        let birth_date = NaiveDate::parse_from_str(birth_date, DRAFT_DATE_FORMAT)
            .map_err(|_| IntakeError::InvalidBirthDate(birth_date.to_string()))?;

        let phone = to_storage_form(&self.phone);
        validate_phone(&phone)?;

        Ok(Record {
            id,
            name: self.name.clone(),
            guardian_name: self.guardian_name.clone(),
            birth_date,
            address: self.address.clone(),
            email: self.email.clone(),
            phone,
            income: parse_income(income)?,
        })
    }

    /// Reset every field (after a successful register)
    pub fn clear(&mut self) {
        *self = RecordDraft::default();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn sample_draft() -> RecordDraft {
        RecordDraft {
            cpf: "123.456.789-01".to_string(),
            name: "Ana Silva".to_string(),
            guardian_name: "Maria Silva".to_string(),
            birth_date: "1990-05-20".to_string(),
            address: "Rua das Flores, 10 - São Paulo - SP".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            income: "12000".to_string(),
        }
    }

    #[test]
    fn test_draft_to_record_uses_storage_forms() {
        let record = sample_draft().to_record().unwrap();

        assert_eq!(record.id, "12345678901");
        assert_eq!(record.phone, "11987654321");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1990, 5, 20).unwrap());
        assert_eq!(record.income, 12000.0);
        assert_eq!(record.name, "Ana Silva");
    }

    #[test]
    fn test_display_forms_are_derived() {
        let record = sample_draft().to_record().unwrap();

        assert_eq!(record.display_identifier(), "123.456.789-01");
        assert_eq!(record.display_phone(), "(11) 98765-4321");
        assert_eq!(record.tier(), IncomeTier::High);
        assert_eq!(record.tier_label().text, "VENDA BOA");
    }

    #[test]
    fn test_short_cpf_is_rejected() {
        let mut draft = sample_draft();
        draft.cpf = "123.456.789-0".to_string();

        assert_eq!(
            draft.to_record(),
            Err(IntakeError::Validation(
                ValidationError::InvalidIdentifierLength { length: 10 }
            ))
        );
    }

    #[test]
    fn test_missing_fields() {
        let mut draft = sample_draft();
        draft.email = "   ".to_string();
        assert_eq!(draft.to_record(), Err(IntakeError::MissingField("email")));

        assert_eq!(
            RecordDraft::default().to_record(),
            Err(IntakeError::MissingField("name"))
        );
    }

    #[test]
    fn test_bad_birth_date() {
        let mut draft = sample_draft();
        draft.birth_date = "20/05/1990".to_string();
        assert!(matches!(
            draft.to_record(),
            Err(IntakeError::InvalidBirthDate(_))
        ));
    }

    #[test]
    fn test_parse_income() {
        assert_eq!(parse_income("3999.99").unwrap(), 3999.99);
        assert_eq!(parse_income("3999,99").unwrap(), 3999.99);
        assert_eq!(parse_income(" 0 ").unwrap(), 0.0);
        assert!(parse_income("-1").is_err());
        assert!(parse_income("NaN").is_err());
        assert!(parse_income("inf").is_err());
        assert!(parse_income("abc").is_err());
    }

    #[test]
    fn test_income_beyond_decimal_range_is_rejected() {
        assert_eq!(parse_income("1e20").unwrap(), 1e20);
        assert_eq!(
            parse_income("1e30"),
            Err(IntakeError::InvalidIncome("1e30".to_string()))
        );
    }

    #[test]
    fn test_income_decimal_keeps_shortest_form() {
        assert_eq!(income_decimal(1.005).unwrap().to_string(), "1.005");
        assert_eq!(income_decimal(0.145).unwrap().to_string(), "0.145");
        assert_eq!(
            income_decimal(1e20).unwrap().to_string(),
            "100000000000000000000"
        );
        assert!(income_decimal(f64::NAN).is_none());
    }

    #[test]
    fn test_draft_is_reusable_after_conversion() {
        let draft = sample_draft();
        let first = draft.to_record().unwrap();
        let second = draft.to_record().unwrap();
        assert_eq!(first, second);
        assert_eq!(draft, sample_draft());
    }

    #[test]
    fn test_clear_draft() {
        let mut draft = sample_draft();
        draft.clear();
        assert_eq!(draft, RecordDraft::default());
    }
}
