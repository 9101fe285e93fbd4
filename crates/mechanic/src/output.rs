//! Terminal output helpers

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.blue} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:32.cyan/blue}] {pos}/{len} {wide_msg}";

pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Batch-level failure; item details go to the log
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Indented `key: value` line under a header
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Indented entry of a plain list, with an optional dimmed note
pub fn list_item(text: &str, note: Option<&str>) {
    match note {
        Some(note) => println!("  {} {}", text, style(format!("({})", note)).dim()),
        None => println!("  {}", text),
    }
}

/// Spinner for work of unknown length, such as loading streams
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = styled(ProgressBar::new_spinner(), SPINNER_TEMPLATE);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar counting records through a batch or an update check
pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = styled(ProgressBar::new(len), BAR_TEMPLATE);
    pb.set_message(msg.to_string());
    pb
}

fn styled(pb: ProgressBar, template: &str) -> ProgressBar {
    // An invalid template falls back to indicatif's default style
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("=> "));
    }
    pb
}
