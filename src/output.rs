//! Console output helpers.
//!
//! All user-facing messages funnel through here so color use stays
//! consistent and verbose-only chatter is gated in one place.

use colored::Colorize;

/// Progress detail, shown only with --verbose.
pub fn verbose(message: &str, enabled: bool) {
    if enabled {
        println!("{}", message.dimmed());
    }
}

pub fn info(message: &str) {
    println!("{message}");
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Non-fatal problem; the run continues.
pub fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

pub fn hint(message: &str) {
    eprintln!("{} {}", "hint:".cyan(), message);
}
