use crate::utility::redact_url_password;
use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use keel::{Engine, Migrate};

#[derive(Parser, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub(crate) fn run(self, engine: &Engine, url: &str, tables: &[&dyn Migrate]) -> Result<()> {
        println!();
        println!("  {}", style("Schema Status").cyan().bold().underlined());
        println!();
        println!(
            "  {}",
            style(format!("Connected to {}", redact_url_password(url))).dim()
        );
        println!();

        let mut conn = crate::connect(url)?;
        let mismatches = engine.check_versions(conn.as_mut(), tables)?;

        if mismatches.is_empty() {
            println!(
                "  {}",
                style(format!("All {} table(s) are up to date.", tables.len()))
                    .green()
                    .dim()
            );
            println!();
            return Ok(());
        }

        for mismatch in &mismatches {
            println!("  {} {}", style("✖").red().bold(), mismatch);
        }
        println!();

        bail!("{} table(s) need migration", mismatches.len())
    }
}
