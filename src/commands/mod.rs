pub mod batch;
pub mod config;
pub mod dedup;
pub mod platforms;
pub mod scrape;

use std::time::Duration;

use garimpo::cli::EngineArg;
use garimpo::fetch::Engine;

pub fn engine_from_arg(arg: Option<EngineArg>, config_default: bool) -> Engine {
    match arg {
        Some(EngineArg::Http) => Engine::Http,
        Some(EngineArg::Browser) => Engine::Browser,
        None if config_default => Engine::Browser,
        None => Engine::Http,
    }
}

/// Human-readable elapsed time ("2m 05s", "850ms").
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if total_secs < 60 {
        return format!("{total_secs}s");
    }
    format!("{}m {:02}s", total_secs / 60, total_secs % 60)
}
