//! Terminal output.
//!
//! Messages (info, success, warnings, errors) go to stderr. Reports and
//! values meant for scripts, such as an installation path, go to stdout.

use colored::Colorize;
use std::path::Path;

/// Width of the key column in [`kv`] reports
const KEY_WIDTH: usize = 14;

/// Print an info message
pub fn info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a report title
pub fn header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print one aligned report line
pub fn kv(key: &str, value: &str) {
    println!("  {} {}", key_column(key).dimmed(), value);
}

fn key_column(key: &str) -> String {
    format!("{:<KEY_WIDTH$}", format!("{key}:"))
}

/// Print a muted report line
pub fn hint(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a path on its own, for scripts to capture
pub fn path(path: &Path) {
    println!("{}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_column_aligns_values() {
        assert_eq!(key_column("Cached"), "Cached:       ");
        assert_eq!(key_column("Cached").len(), key_column("Install dir").len());
    }

    #[test]
    fn test_key_column_keeps_long_keys_whole() {
        assert_eq!(key_column("A rather long key"), "A rather long key:");
    }
}
