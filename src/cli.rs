use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "addonctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and render cluster component manifests")]
#[command(long_about = "Decodes HCL component configuration, reports every problem it finds, and renders the embedded chart of each component into ready-to-apply Kubernetes manifests. Never contacts a cluster.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available components and their namespaces
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Decode component configuration and report diagnostics
    Validate {
        /// Configuration file, or directory of configuration files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Only validate these components (default: every configured component)
        #[arg(short = 'C', long = "component", value_name = "NAME")]
        components: Vec<String>,

        /// Variables file providing `var.<name>` values
        #[arg(long, value_name = "FILE")]
        vars: Option<PathBuf>,
    },

    /// Render component manifests
    Render {
        /// Configuration file, or directory of configuration files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Components to render
        #[arg(short = 'C', long = "component", value_name = "NAME", required = true)]
        components: Vec<String>,

        /// Variables file providing `var.<name>` values
        #[arg(long, value_name = "FILE")]
        vars: Option<PathBuf>,

        /// Write manifests under this directory instead of stdout
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
