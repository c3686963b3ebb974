use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use davdrive::{
    config::Config,
    models::AnnotatedEntry,
    services::DirectoryTarget,
    AppError, FileBrowserView, FileClient, SessionProvider, SessionStore, ViewState,
};

#[derive(Parser)]
#[command(name = "davdrive", about = "Browse your files on a WebDAV server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the files in your home collection
    Ls {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a local file
    Put {
        file: PathBuf,
        /// Keep an existing remote file instead of replacing it
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Download a remote file
    Get {
        name: String,
        /// Directory to save into (defaults to DOWNLOAD_DIR)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Delete a remote file
    Rm { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,davdrive=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let sessions = Arc::new(match config.session_file {
        Some(ref path) => SessionStore::load(path).await?,
        None => SessionStore::default(),
    });
    if let Some(session) = config.env_session()? {
        sessions.sign_in(session).await?;
    }

    let session = sessions
        .current_session()
        .ok_or_else(|| anyhow!("Not signed in: set DAV_TOKEN or DAV_SESSION_FILE"))?;

    let provider: Arc<dyn SessionProvider> = sessions.clone();
    let client = Arc::new(FileClient::configure(config.webdav_config(&session), provider.clone())?);
    info!("Using {}", client.base_url());

    let mut view = FileBrowserView::new(client, provider);
    view.init().await;
    ensure_signed_in(&view)?;

    let mut json = false;
    match cli.command {
        Command::Ls { json: as_json } => json = as_json,
        Command::Put { file, no_overwrite } => {
            view.on_file_selected(&[file]).await;
            if view.pending_upload().is_some() {
                view.submit_upload_with(!no_overwrite).await;
            }
        }
        Command::Get { name, output } => {
            let target = DirectoryTarget::new(output.unwrap_or_else(|| config.download_dir.clone()));
            view.request_download(&name, &target).await;
            if view.last_error().is_none() {
                println!("Saved {}", target.local_path(&name).display());
            }
        }
        Command::Rm { name } => view.request_delete(&name).await,
    }

    ensure_signed_in(&view)?;

    if json {
        println!("{}", serde_json::to_string_pretty(view.entries())?);
    } else {
        print_listing(view.entries(), view.label_text());
    }

    if let Some(error) = view.last_error() {
        let mut message = error.user_message();
        if let Some(action) = error.suggested_action() {
            message.push_str(&format!(". {}", action));
        }
        return Err(anyhow!("{} [{}]", message, error.error_code()));
    }

    Ok(())
}

fn ensure_signed_in(view: &FileBrowserView) -> Result<()> {
    if view.state() == ViewState::LoggedOut {
        return Err(anyhow!(
            "Session is no longer valid and has been logged out; sign in again ({})",
            view.route().path()
        ));
    }
    Ok(())
}

fn print_listing(entries: &[AnnotatedEntry], status: &str) {
    if !status.is_empty() {
        println!("{}", status);
    }

    if entries.is_empty() {
        println!("(empty)");
        return;
    }

    println!("{:<16} {:>12}  {:<11}  NAME", "TYPE", "SIZE", "MODIFIED");
    for entry in entries {
        println!(
            "{:<16} {:>12}  {:<11}  {}",
            entry.icon_class,
            entry.display_size,
            entry.display_date,
            entry.name()
        );
    }
}
