//! Configuration inspection commands.

use clap::{Args, Subcommand};

use homecare_core::config::AppConfig;
use homecare_core::error::AppError;
use homecare_database::redact_url;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets redacted
    Show,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = redact_url(&shown.database.url);

            match format {
                OutputFormat::Table => {
                    let n = &shown.notification;
                    output::print_kv("Database", &shown.database.url);
                    output::print_kv("Timezone", &n.timezone);
                    output::print_kv("Schedule days", &n.effective_schedule_days().to_string());
                    output::print_kv(
                        "Weekly reminder",
                        &format!(
                            "Mon {:02}:{:02}",
                            n.weekly_reminder_hour, n.weekly_reminder_minute
                        ),
                    );
                    output::print_kv("Batch size", &n.effective_batch_size().to_string());
                    output::print_kv(
                        "Worker",
                        &format!(
                            "enabled={} every {}s",
                            shown.worker.enabled,
                            shown.worker.interval().as_secs()
                        ),
                    );
                    output::print_kv("Sender", &format!("{:?}", shown.sender.provider));
                    output::print_kv(
                        "Logging",
                        &format!("{} ({})", shown.logging.level, shown.logging.format),
                    );
                }
                OutputFormat::Json => output::print_item(&shown, format),
            }
        }
    }

    Ok(())
}
