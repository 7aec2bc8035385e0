// 🚨 Error taxonomy
// Every condition here is recoverable and caller-visible, never process-fatal.

use thiserror::Error;

/// Structural check failed on a storage-form value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// CPF storage form is not exactly 11 digits
    #[error("CPF deve ter 11 dígitos (recebido: {length})")]
    InvalidIdentifierLength { length: usize },

    /// Phone storage form is not 10 or 11 digits
    #[error("telefone deve ter 10 ou 11 dígitos (recebido: {length})")]
    InvalidPhoneLength { length: usize },
}

/// Registry lookup outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("CPF não encontrado no banco de dados: {id}")]
    NotFound { id: String },
}

/// Report/export refusal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Export is refused rather than emitting a banner-only document
    #[error("não há dados para exportar")]
    EmptyRegistry,
}

/// Raw form input could not become a Record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("campo obrigatório vazio: {0}")]
    MissingField(&'static str),

    #[error("data de nascimento inválida: {0}")]
    InvalidBirthDate(String),

    #[error("renda inválida: {0}")]
    InvalidIncome(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
