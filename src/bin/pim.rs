use clap::Parser;
use azure_pim::cli::Cli;
use azure_pim::error::PimError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so PIM_* overrides apply during local runs
    let _ = dotenvy::dotenv();

    let filter = std::env::var("PIM_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = azure_pim::cli::run(cli).await {
        let pim_error = e.chain().find_map(|cause| cause.downcast_ref::<PimError>());

        if pim_error.is_some_and(PimError::is_cancelled) {
            println!("\n⚠️  Operation cancelled by user");
            std::process::exit(130);
        }

        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(pim_error.map(PimError::exit_code).unwrap_or(1));
    }
}
