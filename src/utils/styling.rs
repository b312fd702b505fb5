//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ___      _        _  ___
    |   \ __ _| |_ __ _(_)/ _ \
    | |) / _` |  _/ _` | | (_) |
    |___/\__,_|\__\__,_|_|\__\_\
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Target detection and model recommendation for tabular data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Settings shown in the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub target: Option<&'a str>,
    pub metrics: Option<&'a Path>,
    pub report: &'a Path,
    pub acceptance_threshold: f64,
    pub fuzzy_cutoff: f64,
    pub association: &'a str,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:   {:<38}│",
        FOLDER,
        truncate_path(card.input, 37)
    );
    println!(
        "    │  {} Target:  {:<38}│",
        TARGET,
        truncate_string(card.target.unwrap_or("(auto-detect)"), 37)
    );
    println!(
        "    │  {} Metrics: {:<38}│",
        CHART,
        card.metrics
            .map(|p| truncate_path(p, 37))
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "    │  {} Report:  {:<38}│",
        SAVE,
        truncate_path(card.report, 37)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  Acceptance threshold: {:<29}│",
        style(format!("{:.1}", card.acceptance_threshold)).yellow()
    );
    println!(
        "    │  Fuzzy match cutoff:   {:<29}│",
        style(format!("{:.2}", card.fuzzy_cutoff)).yellow()
    );
    println!(
        "    │  Association scorer:   {:<29}│",
        style(card.association).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print a labelled value
pub fn print_detail(label: &str, value: &str) {
    println!("      {} {}", style(format!("{}:", label)).dim(), style(value).bold());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {} {}", ROCKET, style("Analysis complete!").green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, threshold_info: Option<&str>) {
    if let Some(info) = threshold_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a_very_long_column_name", 10), "...mn_name");
    }
}
