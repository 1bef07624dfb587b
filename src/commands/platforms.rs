use colored::Colorize;

use garimpo::platform::Platform;
use garimpo::Result;

pub fn run() -> Result<()> {
    println!("{}", "Supported stores:".bold());
    for platform in Platform::ALL {
        let profile = platform.profile();
        println!(
            "  {:<14} hosts matching: {}",
            profile.label.green(),
            profile.url_markers.join(", ")
        );
    }
    Ok(())
}
