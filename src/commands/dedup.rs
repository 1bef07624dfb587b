use std::path::Path;

use garimpo::config::Config;
use garimpo::dedup::reduce_directory;
use garimpo::output;
use garimpo::{GarimpoError, Result};

pub fn run(dir: &Path, min_bytes: Option<u64>, verbose: bool) -> Result<()> {
    if !dir.is_dir() {
        return Err(GarimpoError::InputInvalid(format!(
            "not a directory: {}",
            dir.display()
        )));
    }
    let config = Config::load()?;
    let min_bytes = min_bytes.unwrap_or(config.min_image_bytes);
    let report = reduce_directory(dir, min_bytes, verbose)?;
    output::success(&format!(
        "{} image(s) kept, {} duplicate(s) removed, {} undersized purged",
        report.kept, report.removed_duplicates, report.purged_small
    ));
    Ok(())
}
