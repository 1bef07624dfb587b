use std::path::PathBuf;
use std::time::Instant;

use colored::Colorize;

use garimpo::cli::EngineArg;
use garimpo::config::Config;
use garimpo::record::ProductRecord;
use garimpo::scrape::{scrape_product, ScrapeOptions};
use garimpo::Result;

use super::{engine_from_arg, format_duration};

#[allow(clippy::too_many_arguments)]
pub fn run(
    url: &str,
    offline: Option<PathBuf>,
    out: Option<PathBuf>,
    engine: Option<EngineArg>,
    json: bool,
    no_media: bool,
    verbose: bool,
) -> Result<()> {
    let config = Config::load()?;
    let mut options = ScrapeOptions::from_config(&config);
    options.engine = engine_from_arg(engine, config.browser_engine);
    options.skip_media = no_media;
    options.verbose = verbose;
    if let Some(dir) = out {
        options.output_dir = dir;
    }

    let started = Instant::now();
    let record = scrape_product(url, offline.as_deref(), &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_summary(&record);
        println!(
            "\nFinished in {}",
            format_duration(started.elapsed()).bold()
        );
    }
    Ok(())
}

fn print_summary(record: &ProductRecord) {
    println!("{}", record.name.bold());
    println!("  Store:       {}", record.platform);
    println!("  Price:       R${}", record.current_price.display().green());
    if record.old_price.is_available() {
        println!(
            "  Was:         R${} ({} off)",
            record.old_price.display().dimmed(),
            record.discount
        );
    }
    if record.international {
        println!("  {}", "International listing".yellow());
    }
    if !record.specifications.is_empty() {
        println!("  Specs:       {} row(s)", record.specifications.len());
    }
    println!(
        "  Media:       {} image(s), {} video(s) found",
        record.image_urls.len(),
        record.video_urls.len()
    );
    if !record.downloaded_files.is_empty() {
        println!("  Saved files:");
        for path in &record.downloaded_files {
            println!("    {}", path.display());
        }
    }
}
