use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use chefboot::{chat, web_server};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the Chef Boot web front end.
    Serve {
        #[arg(long, default_value_t = 8990, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with Chef Boot in the terminal.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY and friends)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!("Chef Boot starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Serve { port } => {
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                result = web_server::start_web_server(port) => {
                    result.context("Web server exited")?;
                }
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down");
                }
            }
        }
        Commands::Chat => {
            chat::run_chat_session()
                .await
                .context("Chat session failed")?;
        }
    }

    Ok(())
}
