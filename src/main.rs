use clap::Parser;
use storyforge::config::setup_logging;
use tracing::{debug, error};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // a missing .env is fine, the environment and flags still apply
    let dotenv = dotenvy::dotenv();

    let cli = storyforge::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }
    if let Err(err) = dotenv {
        debug!("No .env loaded: {}", err);
    }

    if let Err(err) = storyforge::web::setup_server(&cli).await {
        error!("Application error: {}", err);
    }
}
