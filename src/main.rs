use anyhow::Context;
use bookaura::{BookMaker, Config, config::parse_rounds, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "bookaura", version, about = "Generate eBooks with a team of writing agents")]
struct Cli {
    /// Author name printed on the cover and given to the team.
    #[arg(long, global = true)]
    author: Option<String>,

    /// Directory that receives one folder per book.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Idea negotiation round cap.
    #[arg(long, global = true, value_parser = parse_max_rounds)]
    max_rounds: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create one book.
    Create {
        #[arg(long)]
        prompt: String,
    },
    /// Create one book per non-blank line of a prompts file.
    Batch {
        #[arg(long)]
        prompts: PathBuf,
        /// Wait for Enter before each book.
        #[arg(long)]
        pause: bool,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
}

fn parse_max_rounds(raw: &str) -> Result<u32, String> {
    parse_rounds(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(author) = cli.author {
        config.author = author;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(max_rounds) = cli.max_rounds {
        config.max_rounds = max_rounds;
    }

    let maker = BookMaker::from_config(config);

    match cli.command {
        Command::Create { prompt } => {
            let output = maker.create_ebook(&prompt).await?;
            println!("eBook created successfully in: {}", output.folder.display());
        }
        Command::Batch { prompts, pause } => {
            let text = std::fs::read_to_string(&prompts)
                .with_context(|| format!("reading {}", prompts.display()))?;
            let mut stdin = BufReader::new(tokio::io::stdin()).lines();

            for prompt in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
                if pause {
                    println!("Press Enter to continue...");
                    if stdin.next_line().await?.is_none() {
                        break;
                    }
                }
                println!("Creating eBook for prompt: {}", prompt);
                let output = maker.create_ebook(prompt).await?;
                println!("eBook created successfully in: {}", output.folder.display());
            }
        }
        Command::Serve { addr } => {
            let app = server::router(server::AppState::new(maker));
            let listener = TcpListener::bind(&addr).await?;
            tracing::info!("Listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
