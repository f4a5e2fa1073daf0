use crate::{theme::confirm_theme, utility::redact_url_password};
use anyhow::Result;
use clap::Parser;
use console::style;
use dialoguer::Confirm;
use keel::{Engine, Migrate, Outcome};

#[derive(Parser, Debug)]
pub struct MigrateCommand {
    /// Record tables that predate the version registry without asking
    #[arg(long)]
    yes: bool,
}

impl MigrateCommand {
    pub(crate) fn run(self, engine: &Engine, url: &str, tables: &[&dyn Migrate]) -> Result<()> {
        println!();
        println!("  {}", style("Migrate Schemas").cyan().bold().underlined());
        println!();
        println!(
            "  {}",
            style(format!("Connected to {}", redact_url_password(url))).dim()
        );
        println!();

        let mut conn = crate::connect(url)?;

        let existing = engine.adoption_candidates(conn.as_mut(), tables)?;
        if !existing.is_empty() {
            println!(
                "  {} No version registry found, but these tables already exist:",
                style("!").yellow().bold()
            );
            for table in &existing {
                println!("      {}", style(table).bold());
            }
            println!(
                "  {}",
                style("They will be recorded at their current version without changes.").dim()
            );
            println!();

            let confirmed = self.yes
                || Confirm::with_theme(&confirm_theme())
                    .with_prompt("Are these tables already at their current schema version?")
                    .default(false)
                    .interact()?;

            if !confirmed {
                println!();
                println!("  {}", style("Aborted.").dim());
                println!();
                return Ok(());
            }
        }

        let report = engine.migrate(conn.as_mut(), tables)?;

        if report.registry_created {
            println!(
                "  {} {}",
                style("✓").green().bold(),
                style(format!("Created registry {}", engine.config().registry_table)).dim()
            );
        }

        for table in &report.tables {
            let marker = match table.outcome {
                Outcome::UpToDate => style("·").dim(),
                Outcome::Adopted => style("!").yellow().bold(),
                Outcome::Created | Outcome::Migrated { .. } => style("✓").green().bold(),
            };
            println!(
                "  {} {} {}",
                marker,
                style(&table.table).bold(),
                style(format!("v{}: {}", table.version, table.outcome)).dim()
            );
        }

        println!();
        if report.is_noop() {
            println!(
                "  {}",
                style("All tables are up to date.").green().dim()
            );
        } else {
            println!(
                "  {}",
                style(format!("Migrated {} table(s)", report.tables.len()))
                    .green()
                    .bold()
            );
        }
        println!();

        Ok(())
    }
}
