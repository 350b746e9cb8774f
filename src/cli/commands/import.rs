//! curate import - Load a directory snapshot from JSON

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;
use crate::import::{ImportReport, import_file};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON document with `categories`, `authors` and `entries`
    pub file: PathBuf,
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let report = import_file(&ctx.db, &args.file)?;

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "file": args.file.display().to_string(),
            "imported": report,
        })))
    } else {
        println!("{}", human_report(&args.file.display().to_string(), &report));
        Ok(())
    }
}

fn human_report(file: &str, report: &ImportReport) -> String {
    let mut lines = vec![format!("{} Imported {}", "✓".green().bold(), file.cyan())];
    for (label, count) in [
        ("categories", report.categories),
        ("authors", report.authors),
        ("entries", report.entries),
        ("links", report.links),
    ] {
        lines.push(format!("  {} {count}", format!("{label:<11}").dimmed()));
    }
    lines.join("\n")
}
