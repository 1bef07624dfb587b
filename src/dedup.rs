//! Duplicate-image reduction.
//!
//! Stores serve the same artwork at several resolutions, so a gallery
//! download often lands near-identical files. Every image in the
//! directory is resized to the directory's minimum common dimensions
//! and hashed; within a hash group only the highest-resolution
//! original survives. Undersized junk files (tracking pixels, broken
//! downloads) are purged independently beforehand.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::output;

/// Files smaller than this are treated as junk, not product imagery.
pub const DEFAULT_MIN_IMAGE_BYTES: u64 = 2048;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Default, Clone, Serialize)]
pub struct DedupReport {
    pub kept: usize,
    pub removed_duplicates: usize,
    pub purged_small: usize,
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly in `dir`, sorted by name for deterministic
/// group ordering.
fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn purge_small(files: &mut Vec<PathBuf>, min_bytes: u64, verbose: bool) -> usize {
    let mut purged = 0;
    files.retain(|path| {
        let too_small = fs::metadata(path).map(|m| m.len() < min_bytes).unwrap_or(false);
        if too_small {
            match fs::remove_file(path) {
                Ok(()) => {
                    output::verbose(&format!("Purged undersized {}", path.display()), verbose);
                    purged += 1;
                    return false;
                }
                Err(err) => output::warn(&format!("Cannot remove {}: {err}", path.display())),
            }
        }
        true
    });
    purged
}

struct LoadedImage {
    path: PathBuf,
    image: image::DynamicImage,
    pixel_count: u64,
}

/// Hash of the pixel buffer after resizing to the common dimensions.
fn normalized_hash(image: &image::DynamicImage, width: u32, height: u32) -> String {
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);
    let mut hasher = Sha256::new();
    hasher.update(resized.to_rgba8().as_raw());
    hex::encode(hasher.finalize())
}

/// Remove duplicate and undersized images from one directory.
///
/// With fewer than two images after the purge there is nothing to
/// compare and the directory is left as-is.
pub fn reduce_directory(dir: &Path, min_bytes: u64, verbose: bool) -> Result<DedupReport> {
    let mut report = DedupReport::default();
    let mut files = image_files(dir)?;
    report.purged_small = purge_small(&mut files, min_bytes, verbose);

    if files.len() < 2 {
        report.kept = files.len();
        return Ok(report);
    }

    let mut loaded = Vec::new();
    for path in files {
        match image::open(&path) {
            Ok(img) => {
                let pixel_count = u64::from(img.width()) * u64::from(img.height());
                loaded.push(LoadedImage {
                    path,
                    image: img,
                    pixel_count,
                });
            }
            // Undecodable files are left alone; they may not be images.
            Err(err) => output::warn(&format!("Cannot decode {}: {err}", path.display())),
        }
    }
    if loaded.len() < 2 {
        report.kept = loaded.len();
        return Ok(report);
    }

    let min_width = loaded.iter().map(|l| l.image.width()).min().unwrap_or(1).max(1);
    let min_height = loaded.iter().map(|l| l.image.height()).min().unwrap_or(1).max(1);

    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in loaded.iter().enumerate() {
        let hash = normalized_hash(&entry.image, min_width, min_height);
        groups.entry(hash).or_default().push(idx);
    }

    for indices in groups.values() {
        let mut members: Vec<&LoadedImage> = indices.iter().map(|&i| &loaded[i]).collect();
        // Highest original resolution first; ties broken by name so
        // repeated runs delete the same files.
        members.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count).then_with(|| a.path.cmp(&b.path)));
        report.kept += 1;
        for duplicate in &members[1..] {
            match fs::remove_file(&duplicate.path) {
                Ok(()) => {
                    output::verbose(
                        &format!("Removed duplicate {}", duplicate.path.display()),
                        verbose,
                    );
                    report.removed_duplicates += 1;
                }
                Err(err) => {
                    output::warn(&format!("Cannot remove {}: {err}", duplicate.path.display()))
                }
            }
        }
    }
    Ok(report)
}
