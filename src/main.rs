//! CLI entry point for study-tracker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_tracker::commands;
use study_tracker::StudyTracker;

#[derive(Parser)]
#[command(name = "study-tracker")]
#[command(version)]
#[command(about = "Browse a markdown study plan and track completed topics", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default study.yml and stub files for every topic
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate the static site
    #[command(alias = "g")]
    Generate {
        /// Regenerate when content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Reload pages when content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove the generated site
    Clean,

    /// List days, topics or tags
    List {
        /// What to list (days, topics, tags)
        #[arg(default_value = "days")]
        r#type: String,
    },

    /// Mark a topic complete, or incomplete if it already is
    Toggle {
        /// Topic id, e.g. 1-2
        id: String,
    },

    /// Show progress per day
    Progress,

    /// Clear all saved progress
    Reset,

    /// Check that every topic's file exists
    Check,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "study_tracker=debug,info"
    } else {
        "study_tracker=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing study directory in {:?}", target_dir);
            let tracker = StudyTracker::new(&target_dir)?;
            let report = commands::init::init_dir(&target_dir, &tracker.registry)?;
            if report.wrote_config {
                println!("Wrote {:?}", target_dir.join(study_tracker::config::CONFIG_FILE));
            }
            println!("Created {} topic file(s)", report.created.len());
        }

        Commands::Generate { watch } => {
            let tracker = StudyTracker::new(&base_dir)?;
            tracing::info!("Generating static files...");
            tracker.generate()?;
            println!("Generated successfully!");

            if watch {
                tokio::task::spawn_blocking(move || commands::generate::watch(&tracker)).await??;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            watch,
        } => {
            let tracker = StudyTracker::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            study_tracker::server::start(&tracker, &ip, port, watch, open).await?;
        }

        Commands::Clean => {
            let tracker = StudyTracker::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            tracker.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let tracker = StudyTracker::new(&base_dir)?;
            commands::list::run(&tracker, &r#type)?;
        }

        Commands::Toggle { id } => {
            let tracker = StudyTracker::new(&base_dir)?;
            let complete = commands::progress::toggle(&tracker, &id)?;
            println!(
                "{} is now {}",
                id,
                if complete { "complete" } else { "incomplete" }
            );
        }

        Commands::Progress => {
            let tracker = StudyTracker::new(&base_dir)?;
            commands::progress::show(&tracker)?;
        }

        Commands::Reset => {
            let tracker = StudyTracker::new(&base_dir)?;
            commands::progress::reset(&tracker)?;
            println!("Progress cleared.");
        }

        Commands::Check => {
            let tracker = StudyTracker::new(&base_dir)?;
            commands::check::run(&tracker)?;
        }

        Commands::Version => {
            println!("study-tracker version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
