use clap::Parser;
use md2pdf::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    match run(cli) {
        Ok(summary) => {
            tracing::info!(?summary, "CLI completed successfully");
            println!(
                "Generated {} document(s) in {}, uploaded {}.",
                summary.manifest.len(),
                summary.generation_root.display(),
                summary.uploaded
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            eprintln!("[ERROR] {e:#}");
            std::process::exit(1);
        }
    }
}
