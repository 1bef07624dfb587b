use clap::Parser;

use garimpo::cli::{Cli, Commands};
use garimpo::output;

mod commands;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape {
            url,
            offline,
            out,
            engine,
            json,
            no_media,
        } => commands::scrape::run(&url, offline, out, engine, json, no_media, cli.verbose),
        Commands::Batch { file, out, engine } => {
            commands::batch::run(&file, out, engine, cli.verbose)
        }
        Commands::Dedup { dir, min_bytes } => commands::dedup::run(&dir, min_bytes, cli.verbose),
        Commands::Platforms => commands::platforms::run(),
        Commands::Config { init } => commands::config::run(init),
    };

    if let Err(err) = result {
        output::error(&err.to_string());
        if let Some(hint) = err.hint() {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
