//! micwave: a terminal microphone visualizer.

mod app;
mod capture;
mod commands;
mod config;
mod logging;
mod setup;
mod ui;
mod visualizer;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
