//! User-facing error and status lines.

use colored::Colorize;

/// Display a configuration error with a hint about where settings come from
pub fn display_config_error(message: &str) {
    eprintln!("{} Configuration error: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!(
        "{} Settings are read from `.logdel.toml` in the target directory or one of its parents, or from --config.",
        "Tip:".cyan().bold()
    );
}

/// Display a validation error for bad command-line input
pub fn display_validation_error(message: &str) {
    eprintln!("{} Invalid input: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!(
        "{} Check the paths and options and try again.",
        "Tip:".cyan().bold()
    );
}

/// Display a generic error
pub fn display_error(message: &str) {
    eprintln!("{} Error: {}", "✗".red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
