use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod cli;

use cli::{Cli, Commands};
use formbuilder::{config::Config, errors::FormError, storage, storage::SqliteStore, tui};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?.with_database_path(cli.database.as_deref());
    config.validate()?;

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&config.log_file, interactive);

    let result = run_command(cli.command.unwrap_or(Commands::Tui), config).await;

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to the configured file; command-line runs also log to stderr.
/// The TUI owns the terminal, so it only logs to the file.
fn init_logging(log_file: &Path, interactive: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "formbuilder=info");
    }

    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "formbuilder.log".into());
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    if let Commands::Tui = command {
        return tui::run_tui(config).await;
    }

    let store = SqliteStore::new(config.database_path_str()).await?;

    match command {
        Commands::Tui => {}
        Commands::List { limit } => {
            let records = storage::load_records(&store).await?;
            info!("Found {} saved submissions", records.len());

            println!("id\ttimestamp\ttitle\tfields\tanswered");
            for record in records.iter().take(limit) {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id,
                    record.timestamp.to_rfc3339(),
                    record.title,
                    record.fields.len(),
                    record.answered_count()
                );
            }
        }
        Commands::Show { id } => {
            let record = storage::find_record(&store, id)
                .await?
                .ok_or(FormError::SubmissionNotFound(id))?;
            println!("{}", record.title);
            println!("submitted\t{}", record.timestamp.to_rfc3339());
            for field in record.fields.iter().filter(|f| f.field_type.is_interactive()) {
                let value = record
                    .value_for(field.id)
                    .map(|v| v.display())
                    .unwrap_or_default();
                println!("{}\t{}", field.label, value);
            }
        }
        Commands::Template { id } => {
            let record = storage::find_record(&store, id)
                .await?
                .ok_or(FormError::SubmissionNotFound(id))?;
            storage::save_template(&store, &record.fields).await?;
            info!(
                "Next new form will start from the {} fields of '{}'",
                record.fields.len(),
                record.title
            );
        }
        Commands::Clear => {
            storage::clear_records(&store).await?;
            info!("Cleared all saved submissions");
        }
    }

    Ok(())
}
