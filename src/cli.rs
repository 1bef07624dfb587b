//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "garimpo",
    version,
    about = "Scrape product pages from Brazilian marketplace listings",
    after_help = "EXAMPLES:\n    \
        garimpo scrape https://pt.aliexpress.com/item/1005123.html\n    \
        garimpo scrape https://br.shein.com/dress-p-123.html --offline page.html\n    \
        garimpo scrape https://shopee.com.br/p/1/2 --engine browser --json\n    \
        garimpo batch urls.txt --out ./Outputs\n    \
        garimpo dedup ./Outputs/Shein\\ -\\ Vestido_Longo\n    \
        garimpo platforms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show per-step progress detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Plain HTTP fetch
    Http,
    /// Headless browser rendering (needs Node.js + Playwright)
    Browser,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a single product page and download its media
    Scrape {
        /// Product page URL (store is detected from the host)
        url: String,

        /// Read the page from a local HTML file instead of fetching
        #[arg(long, value_name = "FILE")]
        offline: Option<PathBuf>,

        /// Base output directory (overrides config)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Fetch engine
        #[arg(long, value_enum)]
        engine: Option<EngineArg>,

        /// Print the extracted record as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Extract fields only; skip all downloads and files
        #[arg(long)]
        no_media: bool,
    },

    /// Scrape every URL listed in a file, one per line
    Batch {
        /// Text file of product URLs (# starts a comment)
        file: PathBuf,

        /// Base output directory (overrides config)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Fetch engine
        #[arg(long, value_enum)]
        engine: Option<EngineArg>,
    },

    /// Remove duplicate and undersized images from a directory
    Dedup {
        /// Directory of downloaded images
        dir: PathBuf,

        /// Minimum image size in bytes; smaller files are purged
        #[arg(long, value_name = "BYTES")]
        min_bytes: Option<u64>,
    },

    /// List the supported stores
    Platforms,

    /// Show the active configuration
    Config {
        /// Write a config file with the current defaults
        #[arg(long)]
        init: bool,
    },
}
