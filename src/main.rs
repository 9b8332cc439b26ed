/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::error::Error;
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;

use bridge_lab::bridge::error::BridgeError;
use bridge_lab::bridge::material::Material;
use bridge_lab::bridge::validation::BridgeValidation;
use bridge_lab::game::{Game, GameConfig};
use bridge_lab::level::library::{levels, LevelName};
use bridge_lab::physics::{presets, PhysicsFeature};
use bridge_lab::{Action, Notice, Outcome};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level to build on
    #[arg(long, default_value = "first-crossing")]
    level: String,

    /// Material for the deck, the truss above it is steel
    #[arg(long, default_value = "road")]
    material: String,

    /// Frames to simulate at most
    #[arg(long, default_value_t = 1800)]
    frames: usize,

    /// Physics preset: default, gentle or stormy
    #[arg(long, default_value = "default")]
    preset: String,

    /// Physics adjustment like gravity=50, may repeat
    #[arg(long = "set")]
    settings: Vec<String>,

    /// List the levels and quit
    #[arg(long)]
    list: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Build without budget limits
    #[arg(long)]
    zen: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    level: String,
    budget: u32,
    budget_used: u32,
    beams: usize,
    validation: BridgeValidation,
    frames: usize,
    outcome: Option<Outcome>,
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();
    if args.list {
        list_levels();
        return Ok(());
    }
    let level =
        LevelName::from_str(&args.level).map_err(|_| BridgeError::UnknownLevel(args.level.clone()))?;
    let material = Material::from_str(&args.material)
        .map_err(|_| BridgeError::UnknownMaterial(args.material.clone()))?;
    let mut physics =
        presets::by_name(&args.preset).ok_or_else(|| format!("Unknown preset \"{}\"", args.preset))?;
    for setting in &args.settings {
        let (name, value) = setting
            .split_once('=')
            .ok_or_else(|| format!("Expected feature=value, got \"{setting}\""))?;
        let feature = PhysicsFeature::from_str(name.trim())?;
        physics.accept(feature.parameter(value.trim().parse()?));
    }

    let config = GameConfig {
        physics,
        ..GameConfig::default()
    };
    let mut game = Game::new(level, config);
    if args.zen {
        report(game.perform(Action::ToggleZen));
    }
    if game.build_demo_truss(material).is_none() {
        log::warn!("Demo truss left unfinished on {level}");
    }

    let mut frames = 0;
    report(game.perform(Action::Test));
    while game.is_testing() && frames < args.frames {
        report(game.frame());
        frames += 1;
    }
    if game.is_testing() {
        log::warn!("No outcome after {frames} frames");
        report(game.perform(Action::StopTest));
    }

    let summary = Report {
        level: level.to_string(),
        budget: game.level().budget,
        budget_used: game.design().total_cost(),
        beams: game.design().beams.len(),
        validation: game.validation().clone(),
        frames,
        outcome: game.outcome().cloned(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&summary);
    }
    Ok(())
}

fn report(notices: Vec<Notice>) {
    for notice in notices {
        match notice {
            Notice::Rejected(_) | Notice::TestBlocked(_) => log::warn!("{notice}"),
            _ => log::info!("{notice}"),
        }
    }
}

fn list_levels() {
    for level in levels() {
        let wind = level
            .wind
            .map(|wind| format!(", wind {wind}"))
            .unwrap_or_default();
        println!(
            "{:<16} {:<16} ${:<6} {} vehicle(s){wind}",
            level.name,
            level.title,
            level.budget,
            level.vehicles.len()
        );
        println!("{:<16} {}", "", level.description);
    }
}

fn print_report(report: &Report) {
    println!("Level {}", report.level);
    println!(
        "{} beams, ${} of ${} spent",
        report.beams, report.budget_used, report.budget
    );
    for finding in &report.validation.errors {
        println!("  error: {}", finding.message);
    }
    for finding in &report.validation.warnings {
        println!("  warning: {}", finding.message);
    }
    match &report.outcome {
        None => println!("No run completed in {} frames", report.frames),
        Some(outcome) => {
            println!(
                "{} after {:.1}s: {} crossed, {} lost, score {}",
                if outcome.passed { "Passed" } else { "Failed" },
                outcome.seconds,
                outcome.vehicles_crossed,
                outcome.vehicles_lost,
                outcome.score
            );
            if !outcome.broken_beams.is_empty() {
                let broken: Vec<String> = outcome.broken_beams.iter().map(|id| id.to_string()).collect();
                println!("  broken: {}", broken.join(", "));
            }
        }
    }
}
