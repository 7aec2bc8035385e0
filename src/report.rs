// 📄 Report Serializer - fixed-layout text export of the registry
//
// Layout (pt-BR):
//
//   ============================================================
//   BASE DE DADOS - CONSULTA CPF
//   Data de Exportação: 15/10/2026, 14:03:22
//   Total de Registros: 2
//   ============================================================
//
//   REGISTRO 1
//   ------------------------------------------------------------
//   NOME: ...
//   ...
//   ANÁLISE: VENDA BOA
//
// Rendering is pure. Writing the artifact to disk is a separate step.

use crate::error::ReportError;
use crate::record::{income_decimal, Record};
use crate::registry::Registry;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::RoundingStrategy;
use std::fs;
use std::path::{Path, PathBuf};

pub const RULE_WIDTH: usize = 60;
pub const REPORT_TITLE: &str = "BASE DE DADOS - CONSULTA CPF";
pub const EXPORT_MIME_TYPE: &str = "text/plain; charset=utf-8";

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

// ============================================================================
// LOCALE RENDERING (pt-BR)
// ============================================================================

/// `dd/mm/yyyy`
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `dd/mm/yyyy, HH:MM:SS` in the wall-clock time given
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// BRL currency: `R$ 12.345,67` (non-breaking space after the symbol)
///
/// Cents are rounded half away from zero on the decimal the user typed,
/// not on the binary `f64`, so `1.005` renders as `R$ 1,01`.
pub fn format_brl(value: f64) -> String {
    let amount = match income_decimal(value.abs()) {
        Some(exact) => {
            let mut rounded =
                exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        None => format!("{:.2}", value.abs()),
    };

    let (units, fraction) = amount.split_once('.').unwrap_or((amount.as_str(), ""));
    let fraction = format!("{:0<2}", fraction);

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let is_zero = units.chars().chain(fraction.chars()).all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{}R$\u{a0}{},{}", sign, grouped, fraction)
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// One `REGISTRO <index>` block, index is 1-based. Ends with a blank line.
pub fn render_record(index: usize, record: &Record) -> String {
    let mut out = String::new();
    out.push_str(&format!("REGISTRO {}\n", index));
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str(&format!("NOME: {}\n", record.name));
    out.push_str(&format!("MÃE: {}\n", record.guardian_name));
    out.push_str(&format!("DATA DE NASCIMENTO: {}\n", format_date(&record.birth_date)));
    out.push_str(&format!("CPF: {}\n", record.display_identifier()));
    out.push_str(&format!("ENDEREÇO: {}\n", record.address));
    out.push_str(&format!("EMAIL: {}\n", record.email));
    out.push_str(&format!("TELEFONE: {}\n", record.display_phone()));
    out.push_str(&format!("RENDA: {}\n", format_brl(record.income)));
    out.push_str(&format!("ANÁLISE: {}\n", record.tier_label().text));
    out.push('\n');
    out
}

/// Render every record in order. Refuses on an empty sequence.
pub fn render_registry_report<Tz: TimeZone>(
    records: &[Record],
    generated_at: &DateTime<Tz>,
) -> Result<String, ReportError> {
    if records.is_empty() {
        return Err(ReportError::EmptyRegistry);
    }

    let banner = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&banner);
    out.push('\n');
    out.push_str(REPORT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Data de Exportação: {}\n",
        format_timestamp(&generated_at.naive_local())
    ));
    out.push_str(&format!("Total de Registros: {}\n", records.len()));
    out.push_str(&banner);
    out.push_str("\n\n");

    for (i, record) in records.iter().enumerate() {
        out.push_str(&render_record(i + 1, record));
    }

    Ok(out)
}

// ============================================================================
// EXPORT ARTIFACT
// ============================================================================

/// Bytes to deliver plus how to deliver them
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// `banco_dados_<YYYY-MM-DD>.txt`, using the UTC calendar date
pub fn export_filename<Tz: TimeZone>(generated_at: &DateTime<Tz>) -> String {
    format!(
        "banco_dados_{}.txt",
        generated_at.naive_utc().date().format("%Y-%m-%d")
    )
}

pub fn export_registry<Tz: TimeZone>(
    registry: &Registry,
    generated_at: &DateTime<Tz>,
) -> Result<ExportArtifact, ReportError> {
    let contents = match render_registry_report(registry.all(), generated_at) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("export refused: {}", e);
            return Err(e);
        }
    };

    let artifact = ExportArtifact {
        filename: export_filename(generated_at),
        mime_type: EXPORT_MIME_TYPE,
        contents,
    };
    tracing::info!(
        filename = %artifact.filename,
        records = registry.size(),
        "export produced"
    );
    Ok(artifact)
}

impl ExportArtifact {
    /// Write into `dir` under the suggested filename
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

        let path = dir.join(&self.filename);
        fs::write(&path, self.contents.as_bytes())
            .with_context(|| format!("Failed to write export file: {:?}", path))?;

        Ok(path)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn ana(income: f64) -> Record {
        Record {
            id: "12345678901".to_string(),
            name: "Ana Silva".to_string(),
            guardian_name: "Maria Silva".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
            address: "Rua das Flores, 10".to_string(),
            email: "ana@example.com".to_string(),
            phone: "11987654321".to_string(),
            income,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 14, 3, 22).unwrap()
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2001, 2, 3).unwrap();
        assert_eq!(format_date(&date), "03/02/2001");
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "R$\u{a0}0,00");
        assert_eq!(format_brl(3999.99), "R$\u{a0}3.999,99");
        assert_eq!(format_brl(12000.0), "R$\u{a0}12.000,00");
        assert_eq!(format_brl(1234567.891), "R$\u{a0}1.234.567,89");
        assert_eq!(format_brl(999.5), "R$\u{a0}999,50");
        assert_eq!(format_brl(-5.0), "-R$\u{a0}5,00");
        assert_eq!(format_brl(-0.001), "R$\u{a0}0,00");
    }

    #[test]
    fn test_format_brl_rounds_typed_midpoints_up() {
        assert_eq!(format_brl(1.005), "R$\u{a0}1,01");
        assert_eq!(format_brl(0.145), "R$\u{a0}0,15");
        assert_eq!(format_brl(2.675), "R$\u{a0}2,68");
        assert_eq!(format_brl(0.125), "R$\u{a0}0,13");

        let typed = crate::record::parse_income("1234,565").unwrap();
        assert_eq!(format_brl(typed), "R$\u{a0}1.234,57");
    }

    #[test]
    fn test_format_brl_large_amounts_keep_every_digit() {
        let income = crate::record::parse_income("1e20").unwrap();
        assert_eq!(
            format_brl(income),
            "R$\u{a0}100.000.000.000.000.000.000,00"
        );
        assert_eq!(
            format_brl(5e21),
            "R$\u{a0}5.000.000.000.000.000.000.000,00"
        );
    }

    #[test]
    fn test_empty_registry_refused() {
        assert_eq!(
            render_registry_report(&[], &generated_at()),
            Err(ReportError::EmptyRegistry)
        );
        assert_eq!(
            export_registry(&Registry::new(), &generated_at()),
            Err(ReportError::EmptyRegistry)
        );
    }

    #[test]
    fn test_report_layout() {
        let report = render_registry_report(&[ana(12000.0)], &generated_at()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "BASE DE DADOS - CONSULTA CPF");
        assert_eq!(lines[2], "Data de Exportação: 15/10/2026, 14:03:22");
        assert_eq!(lines[3], "Total de Registros: 1");
        assert_eq!(lines[4], "=".repeat(60));
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "REGISTRO 1");
        assert_eq!(lines[7], "-".repeat(60));
        assert_eq!(lines[8], "NOME: Ana Silva");
        assert_eq!(lines[9], "MÃE: Maria Silva");
        assert_eq!(lines[10], "DATA DE NASCIMENTO: 20/05/1990");
        assert_eq!(lines[11], "CPF: 123.456.789-01");
        assert_eq!(lines[12], "ENDEREÇO: Rua das Flores, 10");
        assert_eq!(lines[13], "EMAIL: ana@example.com");
        assert_eq!(lines[14], "TELEFONE: (11) 98765-4321");
        assert_eq!(lines[15], "RENDA: R$\u{a0}12.000,00");
        assert_eq!(lines[16], "ANÁLISE: VENDA BOA");
        assert_eq!(lines[17], "");
        assert_eq!(lines.len(), 18);
        assert!(report.ends_with("ANÁLISE: VENDA BOA\n\n"));
    }

    #[test]
    fn test_lower_income_changes_only_value_lines() {
        let high = render_registry_report(&[ana(12000.0)], &generated_at()).unwrap();
        let low = render_registry_report(&[ana(3000.0)], &generated_at()).unwrap();

        assert!(low.contains("ANÁLISE: VENDA RUIM"));
        assert!(!low.contains("VENDA BOA"));

        let high_lines: Vec<&str> = high.lines().collect();
        let low_lines: Vec<&str> = low.lines().collect();
        assert_eq!(high_lines.len(), low_lines.len());

        let changed: Vec<&str> = high_lines
            .iter()
            .zip(&low_lines)
            .filter(|(a, b)| a != b)
            .map(|(a, _)| a.split(':').next().unwrap_or(""))
            .collect();
        assert_eq!(changed, vec!["RENDA", "ANÁLISE"]);
    }

    #[test]
    fn test_records_numbered_in_order() {
        let mut second = ana(4500.0);
        second.name = "Bruno".to_string();
        let report = render_registry_report(&[ana(100.0), second], &generated_at()).unwrap();

        let first_pos = report.find("REGISTRO 1").unwrap();
        let second_pos = report.find("REGISTRO 2").unwrap();
        assert!(first_pos < second_pos);
        assert!(report.contains("Total de Registros: 2"));
        assert!(report.contains("ANÁLISE: VENDA MODERADA"));
    }

    #[test]
    fn test_timestamp_uses_local_wall_clock() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let at = generated_at().with_timezone(&offset);
        let report = render_registry_report(&[ana(1.0)], &at).unwrap();

        assert!(report.contains("Data de Exportação: 15/10/2026, 11:03:22"));
    }

    #[test]
    fn test_export_artifact() {
        let mut registry = Registry::new();
        registry.append(ana(12000.0));

        let artifact = export_registry(&registry, &generated_at()).unwrap();
        assert_eq!(artifact.filename, "banco_dados_2026-10-15.txt");
        assert_eq!(artifact.mime_type, "text/plain; charset=utf-8");
        assert!(artifact.contents.contains("REGISTRO 1"));
    }

    #[test]
    fn test_export_filename_uses_utc_date() {
        // 22:30 in UTC-3 is already the next day in UTC
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2026, 10, 15, 22, 30, 0).unwrap();
        assert_eq!(export_filename(&at), "banco_dados_2026-10-16.txt");
    }
}
