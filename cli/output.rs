use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use srcpack_core::{AppError, output_formats};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::cli_args::FormatOutputOpts;
use crate::commands::generate::BundleReport;
use crate::commands::metrics::BundleMetrics;

pub fn write_to_file(path: &Path, content: &str) -> srcpack_core::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let mut file = File::create(path).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.write_all(content.as_bytes())
        .map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.is_empty() && !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// JSON when `-f json` was given, otherwise the prepared text.
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: String,
    format_opts: &FormatOutputOpts,
) -> Result<()> {
    match format_opts.format.as_deref() {
        Some("json") => {
            let content = output_formats::serialize_to_json(data, !format_opts.compact)?;
            write_to_stdout(&content)
        }
        _ => write_to_stdout(&plain_text),
    }
}

pub fn readable_size(bytes: usize) -> String {
    let adjusted = Byte::from_u64(bytes as u64).get_appropriate_unit(UnitType::Binary);
    format!("{:.1}", adjusted)
}

pub fn print_generate_summary(reports: &[BundleReport], dry_run: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Bundle").fg(Color::Green),
        Cell::new("Files").fg(Color::Green),
        Cell::new("Lines").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Destination").fg(Color::Green),
    ]);
    for report in reports {
        let row = match &report.outcome {
            Ok(result) => vec![
                Cell::new(&report.name).fg(Color::Cyan),
                Cell::new(result.file_count()).set_alignment(CellAlignment::Right),
                Cell::new(result.total_lines()).set_alignment(CellAlignment::Right),
                Cell::new(readable_size(result.content.len()))
                    .set_alignment(CellAlignment::Right)
                    .fg(Color::DarkGrey),
                Cell::new(report.outfile.display()),
            ],
            Err(e) => vec![
                Cell::new(&report.name).fg(Color::Red),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new(format!("failed: {}", e)).fg(Color::Red),
            ],
        };
        table.add_row(row);
    }
    println!("{table}");

    let built = reports.iter().filter(|r| r.outcome.is_ok()).count();
    let verb = if dry_run { "assembled (dry run)" } else { "written" };
    println!(
        "{} {}/{} bundles {}",
        "✅".green(),
        built.to_string().cyan(),
        reports.len(),
        verb
    );
}

pub fn print_metrics_tables(metrics: &[BundleMetrics]) {
    for bundle in metrics {
        println!();
        println!(
            "{}",
            format!(" Bundle: {} ", bundle.name).green().bold().underline()
        );
        println!(
            "{:<14} {}",
            "Files:".green(),
            bundle.file_count.to_string().cyan()
        );
        println!(
            "{:<14} {}",
            "Lines:".green(),
            bundle.total_lines.to_string().cyan()
        );
        println!("{:<14} {}", "Size:".green(), bundle.size_readable.cyan());

        if bundle.files.is_empty() {
            println!("\n{}", "(No files matched)".yellow());
            continue;
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").fg(Color::Green),
            Cell::new("Path").fg(Color::Green),
            Cell::new("Lines").fg(Color::Green),
            Cell::new("Range").fg(Color::Green),
        ]);
        for (i, entry) in bundle.files.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(&entry.path).fg(Color::Cyan),
                Cell::new(entry.lines).set_alignment(CellAlignment::Right),
                Cell::new(format!("L{}-L{}", entry.start_line, entry.end_line))
                    .fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }
    println!();
}
