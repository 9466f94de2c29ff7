//! Notification template commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use homecare_core::config::AppConfig;
use homecare_core::error::AppError;
use homecare_database::{DatabasePool, TemplateRepository, TemplateStore};
use homecare_entity::notification::TemplateCode;

use crate::output::{self, OutputFormat};

/// Arguments for template commands
#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template subcommand
    #[command(subcommand)]
    pub command: TemplateCommand,
}

/// Template subcommands
#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// Insert any missing default templates
    Seed,
    /// List all templates
    List,
    /// Activate a template so its events are delivered again
    Enable {
        /// Template code, e.g. APPT_1D
        code: String,
    },
    /// Deactivate a template; due events for it fail until re-enabled
    Disable {
        /// Template code, e.g. APPT_1D
        code: String,
    },
}

/// Template display row for table output
#[derive(Debug, Serialize, Tabled)]
struct TemplateRow {
    /// Template code
    code: String,
    /// Title
    title: String,
    /// Active flag
    active: bool,
    /// Created at
    created_at: String,
}

/// Execute template commands
pub async fn execute(
    args: &TemplateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let templates = TemplateRepository::new(db.pool().clone());

    match &args.command {
        TemplateCommand::Seed => {
            let created = templates.seed_default_templates().await?;
            output::print_success(&format!("{created} template(s) created"));
        }
        TemplateCommand::List => {
            let rows: Vec<TemplateRow> = templates
                .list_templates()
                .await?
                .into_iter()
                .map(|t| TemplateRow {
                    code: t.code,
                    title: t.title,
                    active: t.is_active,
                    created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        TemplateCommand::Enable { code } => set_active(&templates, code, true).await?,
        TemplateCommand::Disable { code } => set_active(&templates, code, false).await?,
    }

    db.close().await;
    Ok(())
}

async fn set_active(
    templates: &TemplateRepository,
    code: &str,
    active: bool,
) -> Result<(), AppError> {
    let code: TemplateCode = code.parse().map_err(AppError::validation)?;
    if !templates.set_template_active(code.as_str(), active).await? {
        return Err(AppError::not_found(format!("Template '{code}' not found")));
    }

    let state = if active { "enabled" } else { "disabled" };
    output::print_success(&format!("Template '{code}' {state}"));
    Ok(())
}
