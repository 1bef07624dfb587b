//! Media pipeline: image/video downloads, page snapshot with
//! localized assets, and the description text file.
//!
//! Every item downloads independently; a single failed URL is logged
//! and skipped so the rest of the gallery still lands on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{GarimpoError, Result};
use crate::fetch::download_bytes;
use crate::output;
use crate::platform::PlatformProfile;
use crate::record::ProductRecord;

/// Upper bound for one ffmpeg HLS remux.
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 300;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];

static IMG_SRC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("Invalid img selector"));

/// Original-URL -> local relative path, for snapshot rewriting.
pub type AssetMap = BTreeMap<String, String>;

/// Pick a file extension from the URL path, falling back to the
/// response content type, then to .jpg.
fn image_extension(url: &str, content_type: Option<&str>) -> &'static str {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let lower = path.to_lowercase();
    for ext in IMAGE_EXTENSIONS {
        if lower.ends_with(ext) {
            // .jpeg normalizes to .jpg
            return if ext == ".jpeg" { ".jpg" } else { ext };
        }
    }
    match content_type {
        Some(ct) if ct.contains("png") => ".png",
        Some(ct) if ct.contains("webp") => ".webp",
        Some(ct) if ct.contains("gif") => ".gif",
        _ => ".jpg",
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Copy a relative media reference from next to the offline HTML file.
fn copy_local(reference: &str, local_base: &Path, dest: &Path) -> Result<()> {
    let source = local_base.join(reference.trim_start_matches("./"));
    if !source.exists() {
        return Err(GarimpoError::InputInvalid(format!(
            "local media file not found: {}",
            source.display()
        )));
    }
    fs::copy(&source, dest)?;
    Ok(())
}

fn download_single_image(
    url: &str,
    output_dir: &Path,
    index: usize,
    local_base: Option<&Path>,
) -> Result<PathBuf> {
    if let (Some(base), false) = (local_base, is_remote(url)) {
        let ext = Path::new(url)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".jpg".to_string());
        let dest = output_dir.join(format!("image_{index:02}{ext}"));
        copy_local(url, base, &dest)?;
        return Ok(dest);
    }
    let (bytes, content_type) = download_bytes(url)?;
    let ext = image_extension(url, content_type.as_deref());
    let dest = output_dir.join(format!("image_{index:02}{ext}"));
    fs::write(&dest, bytes)?;
    Ok(dest)
}

/// Download (or copy) every gallery image. Failures are skipped; the
/// returned paths are the images that actually landed on disk.
pub fn download_images(
    urls: &[String],
    output_dir: &Path,
    local_base: Option<&Path>,
    verbose: bool,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for (index, url) in urls.iter().enumerate() {
        match download_single_image(url, output_dir, index + 1, local_base) {
            Ok(path) => {
                output::verbose(&format!("Saved {}", path.display()), verbose);
                paths.push(path);
            }
            Err(err) => output::warn(&format!("Skipping image {url}: {err}")),
        }
    }
    paths
}

/// Run a command, killing it after `timeout`.
fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<bool> {
    let mut child = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GarimpoError::ToolUnavailable("ffmpeg not found on PATH".to_string())
            } else {
                GarimpoError::IoError(e)
            }
        })?;
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.success());
        }
        if started.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(false);
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

/// Remux an HLS stream to MP4 without re-encoding.
fn download_hls(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let mut command = Command::new("ffmpeg");
    command
        .arg("-i")
        .arg(url)
        .arg("-c")
        .arg("copy")
        .arg("-bsf:a")
        .arg("aac_adtstoasc")
        .arg("-y")
        .arg(dest);
    let ok = run_with_timeout(command, timeout)?;
    if !ok || !dest.exists() {
        return Err(GarimpoError::RemuxError(format!(
            "ffmpeg failed or timed out for {url}"
        )));
    }
    Ok(())
}

fn download_single_video(
    url: &str,
    output_dir: &Path,
    index: usize,
    local_base: Option<&Path>,
    ffmpeg_timeout: Duration,
) -> Result<PathBuf> {
    if let (Some(base), false) = (local_base, is_remote(url)) {
        let ext = Path::new(url)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".mp4".to_string());
        let dest = output_dir.join(format!("video_{index:02}{ext}"));
        copy_local(url, base, &dest)?;
        return Ok(dest);
    }
    let dest = output_dir.join(format!("video_{index:02}.mp4"));
    if url.contains(".m3u8") {
        download_hls(url, &dest, ffmpeg_timeout)?;
    } else {
        let (bytes, _) = download_bytes(url)?;
        fs::write(&dest, bytes)?;
    }
    Ok(dest)
}

/// Download every product video with per-item failure isolation.
pub fn download_videos(
    urls: &[String],
    output_dir: &Path,
    local_base: Option<&Path>,
    ffmpeg_timeout: Duration,
    verbose: bool,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for (index, url) in urls.iter().enumerate() {
        match download_single_video(url, output_dir, index + 1, local_base, ffmpeg_timeout) {
            Ok(path) => {
                output::verbose(&format!("Saved {}", path.display()), verbose);
                paths.push(path);
            }
            Err(err) => {
                output::warn(&format!("Skipping video {url}: {err}"));
                if let Some(hint) = err.hint() {
                    output::hint(hint);
                }
            }
        }
    }
    paths
}

/// Download every inline `<img src>` into `assets/` and map each
/// original reference to its local relative path.
pub fn collect_assets(html: &str, page_url: &str, output_dir: &Path, verbose: bool) -> AssetMap {
    let assets_dir = output_dir.join("assets");
    let mut asset_map = AssetMap::new();
    if let Err(err) = fs::create_dir_all(&assets_dir) {
        output::warn(&format!("Cannot create assets directory: {err}"));
        return asset_map;
    }
    let doc = Html::parse_document(html);
    for (index, img) in doc.select(&IMG_SRC_SELECTOR).enumerate() {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if src.is_empty() || src.starts_with("data:") || asset_map.contains_key(src) {
            continue;
        }
        let absolute = match Url::parse(page_url).and_then(|b| b.join(src)) {
            Ok(url) => url.to_string(),
            Err(_) => continue,
        };
        match download_bytes(&absolute) {
            Ok((bytes, content_type)) => {
                let ext = image_extension(&absolute, content_type.as_deref());
                let filename = format!("image_{}{ext}", index + 1);
                if fs::write(assets_dir.join(&filename), bytes).is_ok() {
                    asset_map.insert(src.to_string(), format!("assets/{filename}"));
                }
            }
            Err(err) => output::verbose(&format!("Asset fetch failed for {src}: {err}"), verbose),
        }
    }
    asset_map
}

/// Write the HTML snapshot with asset references rewritten to their
/// local paths.
///
/// Replacement is literal string substitution, longest URL first: when
/// one captured URL is a strict prefix of another, replacing the short
/// one first would corrupt the longer occurrence.
pub fn save_snapshot(html: &str, output_dir: &Path, asset_map: &AssetMap) -> Result<PathBuf> {
    let mut keys: Vec<&String> = asset_map.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let mut modified = html.to_string();
    for key in keys {
        modified = modified.replace(key.as_str(), asset_map[key].as_str());
    }
    let snapshot_path = output_dir.join("page.html");
    fs::write(&snapshot_path, modified)?;
    Ok(snapshot_path)
}

/// Write `<name>_description.txt` with the share-ready summary.
///
/// An unidentified product gets no description file; the template
/// would carry no useful information.
pub fn write_description_file(record: &ProductRecord, profile: &PlatformProfile, output_dir: &Path) -> Result<Option<PathBuf>> {
    if !record.has_name() {
        return Ok(None);
    }
    let content = format!(
        "Product Name: {name}\n\n\
         Price: From R${current} to R${old} ({discount})\n\n\
         Description: {description}\n\n\
         🛒 Encontre {storefront}:\n\
         👉 {url}",
        name = crate::normalize::title_case(&record.name),
        current = record.current_price.display(),
        old = record.old_price.display(),
        discount = record.discount,
        description = record.description,
        storefront = profile.storefront_phrase,
        url = record.url,
    );
    let path = output_dir.join(format!("{}_description.txt", record.name));
    fs::write(&path, content)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn extension_from_url_path() {
        assert_eq!(image_extension("https://cdn.x/a.png?v=2", None), ".png");
        assert_eq!(image_extension("https://cdn.x/a.jpeg", None), ".jpg");
        assert_eq!(image_extension("https://cdn.x/a.webp", None), ".webp");
    }

    #[test]
    fn extension_from_content_type_fallback() {
        assert_eq!(image_extension("https://cdn.x/file", Some("image/png")), ".png");
        assert_eq!(image_extension("https://cdn.x/file", Some("image/gif")), ".gif");
        assert_eq!(image_extension("https://cdn.x/file", None), ".jpg");
    }

    #[test]
    fn snapshot_replaces_longest_url_first() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<img src="https://c/a.jpg"/><img src="https://c/a.jpg?size=big"/>"#;
        let mut map = AssetMap::new();
        map.insert("https://c/a.jpg".to_string(), "assets/image_1.jpg".to_string());
        map.insert(
            "https://c/a.jpg?size=big".to_string(),
            "assets/image_2.jpg".to_string(),
        );
        let path = save_snapshot(html, dir.path(), &map).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains(r#"src="assets/image_1.jpg""#));
        assert!(written.contains(r#"src="assets/image_2.jpg""#));
        assert!(!written.contains("https://c/a.jpg"));
    }

    #[test]
    fn snapshot_without_assets_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<html><body>intacto</body></html>";
        let path = save_snapshot(html, dir.path(), &AssetMap::new()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), html);
    }

    #[test]
    fn description_file_contains_template_fields() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Platform::Shein.profile();
        let mut record = ProductRecord::new("Shein", "https://br.shein.com/p.html");
        record.name = "Vestido_Longo".to_string();
        record.current_price = crate::record::Price::new("79", "90");
        record.old_price = crate::record::Price::new("99", "90");
        record.discount = "20%".to_string();
        record.description = "Um vestido elegante.".to_string();
        let path = write_description_file(&record, profile, dir.path())
            .unwrap()
            .unwrap();
        assert!(path.ends_with("Vestido_Longo_description.txt"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("Product Name: Vestido_Longo"));
        assert!(content.contains("Price: From R$79,90 to R$99,90 (20%)"));
        assert!(content.contains("🛒 Encontre na Shein:"));
        assert!(content.contains("👉 https://br.shein.com/p.html"));
    }

    #[test]
    fn unknown_product_gets_no_description_file() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Platform::Shein.profile();
        let record = ProductRecord::new("Shein", "https://br.shein.com/p.html");
        let result = write_description_file(&record, profile, dir.path()).unwrap();
        assert!(result.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn local_image_copy_in_offline_mode() {
        let base = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir(base.path().join("images")).unwrap();
        fs::write(base.path().join("images/a.jpg"), b"jpegbytes").unwrap();
        let paths = download_images(
            &["./images/a.jpg".to_string()],
            out.path(),
            Some(base.path()),
            false,
        );
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("image_01.jpg"));
        assert_eq!(fs::read(&paths[0]).unwrap(), b"jpegbytes");
    }

    #[test]
    fn missing_local_image_is_skipped_not_fatal() {
        let base = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let paths = download_images(
            &["./images/absent.jpg".to_string()],
            out.path(),
            Some(base.path()),
            false,
        );
        assert!(paths.is_empty());
    }
}
