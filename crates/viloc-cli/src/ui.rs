// Console output helpers. Logs go to stderr; these write the command result
// to stdout.

use color_eyre::eyre::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn ok(use_color: bool, msg: &str) {
    if use_color {
        println!("{} {}", "✔".green(), msg);
    } else {
        println!("✔ {msg}");
    }
}

pub fn warn(use_color: bool, msg: &str) {
    if use_color {
        println!("{} {}", "⚠".yellow(), msg.yellow());
    } else {
        println!("⚠ {msg}");
    }
}

/// One indented path line, e.g. a rewritten file.
pub fn path_line(use_color: bool, prefix: &str, path: &Path) {
    if use_color {
        println!("  {} {}", prefix.cyan(), path.display().blue());
    } else {
        println!("  {} {}", prefix, path.display());
    }
}

pub fn failure_line(use_color: bool, path: &Path, error: &str) {
    if use_color {
        println!("  {} {} ({})", "✖".red(), path.display().blue(), error.red());
    } else {
        println!("  ✖ {} ({})", path.display(), error);
    }
}

pub fn dry_run_note(use_color: bool, dry_run: bool) {
    if dry_run {
        warn(use_color, "dry run: nothing was written");
    }
}
