// Close CRM extractor - CLI Binary
// Run with: cargo run --bin closeio-tap -- sync -c config.json

use clap::Parser;
use closeio_tap_lib::cli::{runner, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    closeio_tap_lib::init_logging(cli.verbose);

    if let Err(e) = runner::run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
