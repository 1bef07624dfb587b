//! Orchestration of one product scrape: fetch, extract, download,
//! reduce, report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::Html;

use crate::config::Config;
use crate::dedup;
use crate::error::{GarimpoError, Result};
use crate::extract;
use crate::fetch::{self, Engine, PageSource};
use crate::media;
use crate::normalize::normalize_name;
use crate::output;
use crate::platform::Platform;
use crate::record::ProductRecord;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub output_dir: PathBuf,
    pub title_case_names: bool,
    pub engine: Engine,
    pub min_image_bytes: u64,
    pub ffmpeg_timeout: Duration,
    /// Extract fields only; download nothing and write nothing.
    pub skip_media: bool,
    pub verbose: bool,
}

impl ScrapeOptions {
    pub fn from_config(config: &Config) -> Self {
        ScrapeOptions {
            output_dir: config.output_dir.clone(),
            title_case_names: config.title_case_names,
            engine: if config.browser_engine {
                Engine::Browser
            } else {
                Engine::Http
            },
            min_image_bytes: config.min_image_bytes,
            ffmpeg_timeout: Duration::from_secs(config.ffmpeg_timeout_secs),
            skip_media: false,
            verbose: false,
        }
    }
}

/// Scrape one product page.
///
/// `local_html` switches to offline mode: the page is read from disk,
/// relative media references are copied from next to it, and no
/// snapshot or asset capture happens.
pub fn scrape_product(
    url: &str,
    local_html: Option<&Path>,
    options: &ScrapeOptions,
) -> Result<ProductRecord> {
    let platform = Platform::detect(url)
        .ok_or_else(|| GarimpoError::UnsupportedPlatform(url.to_string()))?;
    let profile = platform.profile();
    output::verbose(&format!("Detected store: {platform}"), options.verbose);

    let source = match local_html {
        Some(path) => PageSource::LocalFile(path.to_path_buf()),
        None => PageSource::Url(url.to_string()),
    };
    let offline = source.is_offline();
    let page = fetch::acquire(&source, options.engine, options.verbose)?;
    let doc = Html::parse_document(&page.html);

    let mut record = ProductRecord::new(profile.label, url);
    if let Some(raw_name) = extract::extract_name(&doc, profile) {
        record.name = normalize_name(&raw_name, options.title_case_names);
    }
    record.current_price = extract::extract_current_price(&doc, profile);
    record.old_price = extract::extract_old_price(&doc, profile);
    record.discount =
        extract::extract_discount(&doc, profile, &record.old_price, &record.current_price);
    record.description = extract::extract_description(&doc, profile);
    record.specifications = extract::extract_specifications(&doc, profile);
    if extract::detect_international(&doc, profile, &record.specifications) {
        record.mark_international();
        output::verbose("International listing detected", options.verbose);
    }

    let base = if offline { None } else { Some(page.url.as_str()) };
    record.image_urls = extract::find_image_urls(&doc, profile, base);
    record.video_urls = extract::find_video_urls(&doc, &page.html, profile, base);
    output::verbose(
        &format!(
            "Found {} image(s) and {} video(s)",
            record.image_urls.len(),
            record.video_urls.len()
        ),
        options.verbose,
    );

    if options.skip_media {
        return Ok(record);
    }

    let product_dir = options
        .output_dir
        .join(format!("{} - {}", profile.label, record.name));
    fs::create_dir_all(&product_dir)?;

    let local_base = local_html.and_then(Path::parent);
    let image_paths = media::download_images(
        &record.image_urls,
        &product_dir,
        local_base,
        options.verbose,
    );
    let video_paths = media::download_videos(
        &record.video_urls,
        &product_dir,
        local_base,
        options.ffmpeg_timeout,
        options.verbose,
    );
    record.downloaded_files.extend(image_paths);
    record.downloaded_files.extend(video_paths);

    // Snapshot capture only makes sense for pages we fetched ourselves.
    if !offline {
        let asset_map = media::collect_assets(&page.html, &page.url, &product_dir, options.verbose);
        match media::save_snapshot(&page.html, &product_dir, &asset_map) {
            Ok(path) => record.downloaded_files.push(path),
            Err(err) => output::warn(&format!("Snapshot failed: {err}")),
        }
    }

    match media::write_description_file(&record, profile, &product_dir) {
        Ok(Some(path)) => record.downloaded_files.push(path),
        Ok(None) => output::verbose(
            "Skipping description file for unidentified product",
            options.verbose,
        ),
        Err(err) => output::warn(&format!("Description file failed: {err}")),
    }

    match dedup::reduce_directory(&product_dir, options.min_image_bytes, options.verbose) {
        Ok(report) => {
            if report.removed_duplicates > 0 || report.purged_small > 0 {
                output::verbose(
                    &format!(
                        "Reduced gallery: {} duplicate(s) removed, {} undersized purged",
                        report.removed_duplicates, report.purged_small
                    ),
                    options.verbose,
                );
            }
            record.downloaded_files.retain(|path| path.exists());
        }
        Err(err) => output::warn(&format!("Image reduction failed: {err}")),
    }

    Ok(record)
}
