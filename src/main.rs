use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use feedcodec::transcode::{read_document, transcode_rss_item};
use feedcodec::xml::parse_content;
use feedcodec::WriterConfig;

#[derive(Parser, Debug)]
#[command(name = "feedcodec", about = "RSS 2.0 / Atom 1.0 transcoder")]
struct Args {
    /// Writer configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the content tree of an XML element as JSON
    Tree {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Convert an RSS <item> into an Atom <entry>
    RssToAtom {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

async fn read_input(path: &Path) -> Result<String> {
    read_document(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WriterConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => WriterConfig::default(),
    };

    match args.command {
        Command::Tree { file } => {
            let xml = read_input(&file).await?;
            let tree = parse_content(&xml)
                .with_context(|| format!("Failed to parse '{}'", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::RssToAtom { file } => {
            let xml = read_input(&file).await?;
            let entry = transcode_rss_item(&xml, &config)
                .with_context(|| format!("Failed to transcode '{}'", file.display()))?;
            println!("{entry}");
        }
    }

    Ok(())
}
