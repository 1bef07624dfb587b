use colored::Colorize;

use garimpo::config::Config;
use garimpo::output;
use garimpo::Result;

pub fn run(init: bool) -> Result<()> {
    if init {
        let path = Config::default().save()?;
        output::success(&format!("Wrote default config to {}", path.display()));
        return Ok(());
    }
    let path = Config::config_path()?;
    let config = Config::load()?;
    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("  (not present; using defaults. Run 'garimpo config --init' to create it)");
    }
    println!("  output_dir          = {}", config.output_dir.display());
    println!("  title_case_names    = {}", config.title_case_names);
    println!("  min_image_bytes     = {}", config.min_image_bytes);
    println!("  ffmpeg_timeout_secs = {}", config.ffmpeg_timeout_secs);
    println!("  browser_engine      = {}", config.browser_engine);
    Ok(())
}
