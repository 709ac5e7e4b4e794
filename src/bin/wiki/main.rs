//! wiki CLI tool
//!
//! ## Commands
//!
//! - `serve`: Run the wiki HTTP server until Ctrl-C
//! - `init [path]`: Create a data directory and a default `wiki.toml`
//! - `render <title>`: Print a page's rendered HTML to stdout
//!
//! Configuration is read from `wiki.toml` in the working directory (or `--config`). The
//! `WIKI_DATA_DIR` and `WIKI_PORT` environment variables override the file, and command line
//! flags override both.

use clap::{Parser, Subcommand};
use plainwiki::{
    config::{WikiConfig, CONFIG_FILE_NAME},
    server::{self, Wiki},
    store::PageStore,
    WikiError,
};
use std::{net::IpAddr, path::PathBuf, sync::Arc};
use tokio::sync::Notify;

#[derive(Parser)]
#[command(name = "wiki")]
#[command(author, version, about = "A minimal personal wiki served over HTTP", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./wiki.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the page files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory with template overrides (edit.html, view.html, index.html)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the wiki over HTTP
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<IpAddr>,

        /// Port to listen on (default: 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the data directory and a default config file
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Render a page to stdout
    Render {
        /// Title of the page to render
        title: String,

        /// Render the edit form instead of the page view
        #[arg(long)]
        edit: bool,
    },
}

impl Cli {
    fn load_config(&self) -> Result<WikiConfig, WikiError> {
        let mut config = match &self.config {
            Some(path) => WikiConfig::from_file(path)?,
            None => WikiConfig::from_file_or_default(CONFIG_FILE_NAME)?,
        };
        config.apply_env()?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.templates {
            config.templates_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = cli.load_config()?;

    match cli.command {
        Commands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }

            // Without a usable content root there is nothing to serve.
            let wiki = match Wiki::from_config(&config) {
                Ok(wiki) => Arc::new(wiki),
                Err(err) => {
                    tracing::error!("unable to start wiki: {}", err);
                    eprintln!("Error: {err}");
                    std::process::exit(1);
                }
            };

            let shutdown = Arc::new(Notify::new());
            let s = shutdown.clone();
            ctrlc::set_handler(move || {
                println!("\nShutting down...");
                s.notify_one();
            })?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async move {
                println!(
                    "Wiki running at http://{}. Press Ctrl-C to stop.",
                    config.socket_addr()
                );
                server::serve(wiki, config.socket_addr(), async move {
                    shutdown.notified().await;
                })
                .await
            })?;
            Ok(())
        }

        Commands::Init { path } => {
            let data_dir = path.join(&config.data_dir);
            PageStore::ensure_root(&data_dir)?;
            println!("✓ Data directory ready: {}", data_dir.display());

            let config_path = path.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                println!("Config file already exists: {}", config_path.display());
            } else {
                config.to_file(&config_path)?;
                println!("✓ Config file created: {}", config_path.display());
            }
            Ok(())
        }

        Commands::Render { title, edit } => {
            let wiki = Wiki::from_config(&config)?;
            let page = wiki.store().load(&title)?;
            let html = if edit {
                wiki.renderer().edit(&page)?
            } else {
                wiki.renderer().view(&page)?
            };
            println!("{html}");
            Ok(())
        }
    }
}
