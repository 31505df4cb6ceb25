// ABOUTME: CLI entry point for mysqldump-migrator
// ABOUTME: Parses commands, routes to handlers, and maps failures to exit codes

use clap::{Parser, Subcommand};
use mysqldump_migrator::commands::{self, migrate::MigrateOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mysqldump-migrator")]
#[command(about = "Dump selected MySQL tables and load them into another instance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump source tables and, when ENABLE_MIGRATE=TRUE, restore them on the target
    Migrate {
        /// JSON file listing structure_only tables
        #[arg(long, default_value = commands::migrate::DEFAULT_TABLES_CONFIG)]
        tables_config: PathBuf,
        /// Directory the dump files are appended to
        #[arg(long, default_value = commands::migrate::DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        /// Load environment variables from this file instead of ./.env
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// Check configuration, client tools, and connectivity without dumping
    Validate {
        /// Load environment variables from this file instead of ./.env
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate {
            tables_config,
            output_dir,
            env_file,
        } => {
            let options = MigrateOptions {
                tables_config,
                output_dir,
                env_file,
            };
            commands::migrate(&options).await.map(|report| {
                tracing::info!(
                    "Wrote {} dump file(s), restored {}",
                    report.artifacts.len(),
                    report.restored.len()
                );
            })
        }
        Commands::Validate { env_file } => commands::validate(env_file.as_deref()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
