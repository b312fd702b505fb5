//! Terminal summary of an analysis

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::insights::Importance;
use crate::pipeline::{AnalysisReport, TargetResolution};

/// Candidate rows shown in the target score table
const MAX_SCORE_ROWS: usize = 5;

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

/// Print the overview, target scores, model ranking and insights
pub fn display_analysis(report: &AnalysisReport) {
    print_section("📋", "ANALYSIS SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Metric", "Value"]));

    table.add_row(vec![Cell::new("📁 Rows"), Cell::new(report.total_rows)]);
    table.add_row(vec![Cell::new("📐 Columns"), Cell::new(report.total_columns)]);
    table.add_row(vec![Cell::new("🧭 Domain"), Cell::new(report.domain.as_str())]);

    let (target, target_color) = match &report.target {
        TargetResolution::Resolved { column, source } => {
            (format!("{} ({})", column, source.as_str()), Color::Green)
        }
        TargetResolution::Unsupervised { reason } => (format!("none: {}", reason), Color::Yellow),
        TargetResolution::NeedsUserInput { attempted_name, .. } => {
            (format!("unresolved '{}'", attempted_name), Color::Red)
        }
    };
    table.add_row(vec![Cell::new("🎯 Target"), Cell::new(target).fg(target_color)]);
    table.add_row(vec![
        Cell::new("🧪 Problem Type"),
        Cell::new(report.problem_type.as_str()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("🔧 Features"),
        Cell::new(format!("{} → {}", report.features_before, report.features_after)),
    ]);
    table.add_row(vec![
        Cell::new("🏆 Best Model"),
        Cell::new(&report.best_model.name)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    let confidence = report.best_model.confidence;
    let color = if confidence >= 80 {
        Color::Green
    } else if confidence >= 50 {
        Color::Yellow
    } else {
        Color::Red
    };
    table.add_row(vec![
        Cell::new("📈 Confidence"),
        Cell::new(format!("{}%", confidence)).fg(color),
    ]);
    print_indented(&table);

    if !report.target_scores.is_empty() {
        print_section("🎯", "TARGET CANDIDATES");
        let mut scores = report.target_scores.clone();
        scores.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(header(&[
            "Column",
            "Semantic",
            "Statistical",
            "Domain",
            "Association",
            "Total",
        ]));
        for s in scores.iter().take(MAX_SCORE_ROWS) {
            table.add_row(vec![
                Cell::new(&s.column),
                Cell::new(format!("{:.1}", s.semantic)),
                Cell::new(format!("{:.1}", s.statistical)),
                Cell::new(format!("{:.1}", s.domain)),
                Cell::new(format!("{:.2}", s.association)),
                Cell::new(format!("{:.2}", s.total)).add_attribute(Attribute::Bold),
            ]);
        }
        print_indented(&table);
    }

    if !report.model_ranking.is_empty() {
        print_section("🤖", "MODEL RANKING");
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(header(&["Model", "Base", "Overfit Gap", "Penalty", "Final"]));
        for m in &report.model_ranking {
            let name_cell = if m.model_name == report.best_model.name {
                Cell::new(&m.model_name).fg(Color::Green)
            } else {
                Cell::new(&m.model_name)
            };
            table.add_row(vec![
                name_cell,
                Cell::new(format!("{:.3}", m.base_score)),
                Cell::new(format!("{:.3}", m.overfit_gap)),
                Cell::new(format!("{:.3}", m.penalty)),
                Cell::new(format!("{:.3}", m.final_score)).add_attribute(Attribute::Bold),
            ]);
        }
        print_indented(&table);
        println!();
        println!("      {}", style(&report.best_model.reasoning).dim());
        println!("      {}", style(&report.best_model.tradeoffs).dim());
    }

    if !report.insights.is_empty() {
        print_section("💡", "INSIGHTS");
        for insight in &report.insights {
            let marker = match insight.importance {
                Importance::High => style("•").red(),
                Importance::Medium => style("•").yellow(),
            };
            println!(
                "      {} {} {}",
                marker,
                style(&insight.title).bold(),
                style(&insight.description).dim()
            );
        }
    }
}
