// CPF Registry - Core Library
// In-memory person registry keyed by CPF: masking, validation, income
// classification and the text export. Used by the TUI, the API server and tests.

pub mod formatter;
pub mod validator;
pub mod error;
pub mod record;
pub mod classifier;
pub mod registry;
pub mod report;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use formatter::{format_identifier, format_phone, to_storage_form};
pub use validator::{validate_identifier, validate_phone};
pub use error::{IntakeError, RegistryError, ReportError, ValidationError};
pub use record::{Record, RecordDraft};
pub use classifier::{classify, tier_label, IncomeTier, StyleToken, TierLabel, TierSummary};
pub use registry::Registry;
pub use report::{
    export_registry, render_record, render_registry_report,
    ExportArtifact, EXPORT_MIME_TYPE,
};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
