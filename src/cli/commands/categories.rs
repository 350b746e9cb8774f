//! curate categories - List categories and their visible entry counts

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Hide categories with no visible entries
    #[arg(long)]
    pub non_empty: bool,
}

pub fn run(ctx: &AppContext, args: &CategoriesArgs) -> Result<()> {
    let mut categories = ctx.db.list_categories()?;
    if args.non_empty {
        categories.retain(|summary| summary.entries > 0);
    }

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "count": categories.len(),
            "categories": categories,
        })));
    }

    if categories.is_empty() {
        println!("{} No categories. Load some with `curate import`.", "!".yellow());
        return Ok(());
    }

    let width = categories
        .iter()
        .map(|summary| summary.category.slug.len())
        .max()
        .unwrap_or_default();
    println!("{}", format!("Categories ({})", categories.len()).bold());
    println!();
    for summary in &categories {
        println!(
            "  {}  {}  {}",
            format!("{:width$}", summary.category.slug).cyan(),
            summary.category.name,
            format!("({})", summary.entries).dimmed(),
        );
    }
    Ok(())
}
