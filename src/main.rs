// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use cpf_registry::config::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    run_ui_mode(&config)
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let _guard = cpf_registry::logging::init_file(&config.logging)?;
    tracing::info!(version = cpf_registry::VERSION, "starting terminal UI");

    // Every session starts with an empty registry
    let mut app = ui::App::new(cpf_registry::Registry::new(), config.export.directory.clone());
    ui::run_ui(&mut app)?;

    tracing::info!(records = app.registry.size(), "terminal UI closed");
    println!("✅ Sessão encerrada ({} registro(s) descartado(s))", app.registry.size());

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin cpf-server --features server");
    std::process::exit(1);
}
