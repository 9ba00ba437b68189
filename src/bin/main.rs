//! Binary entrypoint for the tinder client

use colored::Colorize;

#[tokio::main]
async fn main() {
    if let Err(err) = tinder_client::cli::run().await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
