// server/src/main.rs

// Entry point of the rendezvous CLI. Argument parsing and dispatch live in
// the cli module.
use anyhow::Result;
use rendezvous_server::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    start_cli().await
}
