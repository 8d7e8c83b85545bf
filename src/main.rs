use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = carecost::api::run_cli() {
        tracing::error!(error = ?e, "run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
