use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod actions;
mod client;
mod interactive;
mod render;

use actions::{BookForm, Feedback};
use client::CatalogClient;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Parser)]
#[command(name = "shelf", version, about = "Book review catalog client")]
struct Cli {
    /// Catalog service address
    #[arg(long, global = true, env = "SHELF_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a book, optionally uploading a local cover image first
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        rating: String,
        /// Local image file to upload as the cover
        #[arg(long, default_value = "")]
        cover: String,
    },
    /// Show a book and its reviews
    Search { title: String },
    /// Submit a review for a book
    Review { title: String, review: String },
    /// List books, optionally only those rated at least MIN_RATING
    List {
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        min_rating: String,
    },
    /// Interactive menu with every action
    Ui,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let client = CatalogClient::new(&cli.base_url)?;
    tracing::debug!(base_url = %cli.base_url, "catalog client ready");

    let feedback = match cli.command {
        Command::AddBook {
            title,
            author,
            description,
            rating,
            cover,
        } => {
            let form = BookForm {
                title,
                author,
                description,
                rating,
                cover_file: cover,
            };
            let feedback = actions::add_book(&client, &form).await;
            if feedback.ok {
                println!("{feedback}");
                actions::refresh(&client, "").await
            } else {
                feedback
            }
        }
        Command::Search { title } => actions::search(&client, &title).await,
        Command::Review { title, review } => actions::review(&client, &title, &review).await,
        Command::List { min_rating } => actions::refresh(&client, &min_rating).await,
        Command::Ui => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            interactive::run(&client, stdin, std::io::stdout()).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(report(&feedback))
}

fn report(feedback: &Feedback) -> ExitCode {
    if feedback.ok {
        // tables and details speak for themselves
        println!("{}", feedback.text);
        ExitCode::SUCCESS
    } else {
        println!("{feedback}");
        ExitCode::FAILURE
    }
}
