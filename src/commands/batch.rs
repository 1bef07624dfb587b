use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;

use garimpo::cli::EngineArg;
use garimpo::config::Config;
use garimpo::output;
use garimpo::scrape::{scrape_product, ScrapeOptions};
use garimpo::{GarimpoError, Result};

use super::{engine_from_arg, format_duration};

pub fn run(
    file: &Path,
    out: Option<PathBuf>,
    engine: Option<EngineArg>,
    verbose: bool,
) -> Result<()> {
    let content = fs::read_to_string(file).map_err(|_| {
        GarimpoError::InputInvalid(format!("cannot read URL list: {}", file.display()))
    })?;
    let urls: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    if urls.is_empty() {
        return Err(GarimpoError::InputInvalid(format!(
            "no URLs found in {}",
            file.display()
        )));
    }

    let config = Config::load()?;
    let mut options = ScrapeOptions::from_config(&config);
    options.engine = engine_from_arg(engine, config.browser_engine);
    options.verbose = verbose;
    if let Some(dir) = out {
        options.output_dir = dir;
    }

    let started = Instant::now();
    println!(
        "Batch of {} URL(s) started at {}\n",
        urls.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for (index, url) in urls.iter().enumerate() {
        println!(
            "{} {url}",
            format!("[{}/{}]", index + 1, urls.len()).bold()
        );
        // One broken listing must not sink the rest of the batch.
        match scrape_product(url, None, &options) {
            Ok(record) => {
                output::success(&format!(
                    "{} ({} file(s))",
                    record.name,
                    record.downloaded_files.len()
                ));
                succeeded += 1;
            }
            Err(err) => {
                output::error(&err.to_string());
                if let Some(hint) = err.hint() {
                    output::hint(hint);
                }
                failed += 1;
            }
        }
    }

    println!(
        "\n{succeeded} scraped, {failed} failed in {}",
        format_duration(started.elapsed()).bold()
    );
    Ok(())
}
