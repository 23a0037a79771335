//! picdrop command-line interface.
//!
//! Drives the share service against the configured backend: upload one or
//! more images, list the gallery, delete one image, or clear everything.
//! Configuration comes from the environment (a `.env` file is honored).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use picdrop_core::models::FileInput;
use picdrop_core::Config;
use picdrop_services::{Notify, ShareService};
use picdrop_storage::create_store;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "picdrop", about = "Upload and share images via a remote store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload one or more image files and print their share URLs
    Upload { paths: Vec<PathBuf> },
    /// List uploaded images, newest first
    List,
    /// Delete one image by record id
    Delete { id: Uuid },
    /// Delete all images
    Clear {
        /// Confirm the bulk delete
        #[arg(long)]
        yes: bool,
    },
    /// Show backend configuration status
    Status,
}

/// Notifier that prints notices to the terminal.
struct ConsoleNotifier;

impl Notify for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "picdrop=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn content_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
    .to_string()
}

async fn read_inputs(paths: &[PathBuf]) -> Result<Vec<FileInput>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        files.push(FileInput::new(filename, content_type_for(path), bytes));
    }
    Ok(files)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    let store = create_store(&config)
        .await
        .context("Failed to initialize remote store")?;
    let mut service = ShareService::new(
        Arc::clone(&store),
        Arc::new(ConsoleNotifier),
        config.max_file_size_bytes,
    );

    match cli.command {
        Command::Upload { paths } => {
            if paths.is_empty() {
                anyhow::bail!("No files given");
            }
            let files = read_inputs(&paths).await?;
            let outcome = service.upload_batch(files).await?;

            // The refresh after the batch lists newest first, so the new
            // uploads head the gallery.
            for record in service.gallery().records().iter().take(outcome.success_count) {
                println!("{}  {}", record.filename, record.url);
            }
        }

        Command::List => {
            service.refresh_gallery().await?;
            if service.gallery().is_empty() {
                println!("No images uploaded yet");
            }
            for record in service.gallery().records() {
                println!(
                    "{}  {}  {}  {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.filename,
                    record.url
                );
            }
        }

        Command::Delete { id } => {
            service.delete_image(id).await?;
        }

        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all images without --yes");
            }
            service.delete_all().await?;
        }

        Command::Status => {
            if store.is_configured() {
                println!("Remote store is configured and ready");
            } else {
                println!(
                    "Remote store is not configured; set SUPABASE_URL and SUPABASE_ANON_KEY \
                     (or select another backend with PICDROP_STORE_BACKEND)"
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a/cat.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("b.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("no_extension")),
            "application/octet-stream"
        );
    }
}
