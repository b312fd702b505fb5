//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Select};

/// What the user picked when the asserted target did not match a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    Column(String),
    AutoDetect,
}

const SHOW_ALL: &str = "Show all columns";
const AUTO_DETECT: &str = "Detect the target automatically";

/// Ask the user to pick one of the suggested columns, any column, or auto-detection
pub fn choose_target(
    attempted: &str,
    suggestions: &[String],
    all_columns: &[String],
) -> Result<TargetChoice> {
    let mut items: Vec<&str> = suggestions.iter().map(String::as_str).collect();
    items.push(SHOW_ALL);
    items.push(AUTO_DETECT);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Column '{}' not found. Did you mean", attempted))
        .items(&items)
        .default(0)
        .interact()?;

    match items[selection] {
        SHOW_ALL => {
            let index = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select the target column")
                .items(all_columns)
                .default(0)
                .interact()?;
            Ok(TargetChoice::Column(all_columns[index].clone()))
        }
        AUTO_DETECT => Ok(TargetChoice::AutoDetect),
        column => Ok(TargetChoice::Column(column.to_string())),
    }
}
