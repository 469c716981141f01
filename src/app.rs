// app.rs - Runs one CLI command against a scene document
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::config::Convention;
use crate::scene::JsonScene;
use crate::selection::{Selection, StandinRow};
use crate::standin::{Standin, SwitchOutcome};
use crate::traits::SceneHost;

/// Per-object result of a mutating command
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub object: String,
    pub applied: bool,
    pub detail: String,
}

impl OutcomeReport {
    fn new(object: &str, outcome: &SwitchOutcome) -> Self {
        Self {
            object: object.to_string(),
            applied: outcome.is_applied(),
            detail: outcome.to_string(),
        }
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let convention = Convention::load(cli.config.as_deref())?;
    let mut scene = JsonScene::load(&cli.scene)?;

    let mut selection = if cli.all {
        Selection::refresh_all(&mut scene, &convention)
    } else {
        Selection::refresh(&mut scene, &convention)
    };
    for invalid in selection.invalid() {
        eprintln!("[!] {}: {} ({})", invalid.object, invalid.reason, invalid.file);
    }

    let modified = match &cli.command {
        Command::List => {
            print_rows(&selection.rows(), cli.json)?;
            false
        }
        Command::Versions { object } => {
            let standin = selection
                .get(object)
                .with_context(|| format!("No valid standin for {}", object))?;
            print_versions(standin, cli.json)?;
            false
        }
        Command::Set { object, variant, version } => {
            let outcome = selection.set_version(&mut scene, object, variant, version)?;
            print_outcomes(&[(object.clone(), outcome)], cli.json)?
        }
        Command::Update { objects } => {
            let targets = update_targets(&selection, objects);
            if targets.is_empty() {
                if cli.json {
                    println!("[]");
                } else {
                    println!("All standins are up to date");
                }
                false
            } else {
                let outcomes = selection.update_to_last(&mut scene, &targets)?;
                print_outcomes(&outcomes, cli.json)?
            }
        }
        Command::ToSd { objects } => {
            let outcomes = selection.switch_to_sd(&mut scene, objects)?;
            print_outcomes(&outcomes, cli.json)?
        }
        Command::ToHd { objects } => {
            let outcomes = selection.switch_to_hd(&mut scene, objects)?;
            print_outcomes(&outcomes, cli.json)?
        }
        Command::Convert { objects } => {
            let converted = selection.convert(&mut scene, objects)?;
            let names: Vec<(String, String)> = converted
                .iter()
                .map(|(object, node)| (object.clone(), scene.node_name(*node)))
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for (object, reference) in &names {
                    println!("{} -> {}", object, reference);
                }
            }
            !names.is_empty()
        }
        Command::OutOfDate => {
            let objects = selection.select_out_of_date(&mut scene);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&objects)?);
            } else if objects.is_empty() {
                println!("All standins are up to date");
            } else {
                for object in &objects {
                    println!("{}", object);
                }
            }
            !objects.is_empty()
        }
    };

    if modified {
        if cli.write {
            scene.save(&cli.scene)?;
            info!("Saved {:?}", cli.scene);
        } else {
            info!("Scene not saved, pass --write to keep changes");
        }
    }
    Ok(())
}

/// Objects an `update` acts on: the named ones, or every out-of-date standin
pub fn update_targets<N: Copy + Eq + std::hash::Hash + std::fmt::Debug>(selection: &Selection<N>, objects: &[String]) -> Vec<String> {
    if objects.is_empty() {
        selection.out_of_date().into_iter().map(str::to_string).collect()
    } else {
        objects.to_vec()
    }
}

fn print_rows(rows: &[StandinRow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<16} {:<8} {:<10} {:<10} {:<6} {:<3} {:<3}",
        "OBJECT", "STANDIN", "VARIANT", "VERSION", "LATEST", "STATUS", "SD", "HD"
    );
    for row in rows {
        println!(
            "{:<24} {:<16} {:<8} {:<10} {:<10} {:<6} {:<3} {:<3}",
            row.object,
            row.standin,
            row.variant,
            row.version,
            row.latest.as_deref().unwrap_or("-"),
            if row.up_to_date { "ok" } else { "old" },
            if row.has_sd { "yes" } else { "-" },
            if row.has_hd { "yes" } else { "-" },
        );
    }
    Ok(())
}

fn print_versions(standin: &Standin, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(standin.versions())?);
        return Ok(());
    }

    println!("{} ({})", standin.object_name(), standin.standin_name());
    for (variant, versions) in standin.versions() {
        println!("  {}", variant);
        for version in versions {
            let active = variant == standin.active_variant() && version.name == standin.active_version();
            let marker = if active { "*" } else { " " };
            println!("    {} {:<10} {}", marker, version.name, version.path.display());
        }
    }
    Ok(())
}

/// Prints outcomes, returning whether anything was applied
fn print_outcomes(outcomes: &[(String, SwitchOutcome)], json: bool) -> Result<bool> {
    let reports: Vec<OutcomeReport> = outcomes
        .iter()
        .map(|(object, outcome)| OutcomeReport::new(object, outcome))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}: {}", report.object, report.detail);
        }
    }
    Ok(reports.iter().any(|report| report.applied))
}
