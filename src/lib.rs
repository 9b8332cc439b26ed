/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::fmt::{Display, Formatter};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bridge::error::BridgeError;
use crate::bridge::material::Material;
use crate::bridge::validation::FindingKind;
use crate::bridge::{BeamId, NodeId};
use crate::level::library::LevelName;

pub mod bridge;
pub mod game;
pub mod level;
pub mod physics;
pub mod pointer;

/// Simulation time, counted in frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Age(u64);

impl Display for Age {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.seconds())
    }
}

impl Age {
    pub fn tick(&mut self) {
        self.0 += 1;
    }

    pub fn frames(&self) -> u64 {
        self.0
    }

    pub fn seconds(&self) -> f32 {
        self.0 as f32 * physics::FRAME_SECONDS
    }
}

/// Everything the player can ask for
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Click(Vec2),
    SelectMaterial(Material),
    Test,
    StopTest,
    Reset,
    ToggleDeleteMode,
    Undo,
    Redo,
    SaveDesign(String),
    RestoreDesign(Option<usize>),
    ToggleStressOverlay,
    ToggleZen,
    TogglePause,
    AdvanceLevel,
    DismissTutorial,
    Highlight(Option<FindingKind>),
}

/// The result of a finished test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub vehicles_crossed: usize,
    pub vehicles_lost: usize,
    pub broken_beams: Vec<BeamId>,
    pub budget_used: u32,
    pub score: i64,
    pub passed: bool,
    pub seconds: f32,
}

/// Transient messages for the player
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NodePlaced(NodeId),
    Selected(Option<NodeId>),
    BeamBuilt { id: BeamId, cost: u32 },
    BeamRemoved { id: BeamId, refund: u32 },
    BeamBroke(BeamId),
    Rejected(BridgeError),
    TestBlocked(Vec<String>),
    TestStarted,
    TestStopped,
    RunFinished(Outcome),
    NothingToUndo,
    NothingToRedo,
    Saved(usize),
    Restored(usize),
    LevelLoaded(LevelName),
    LevelLocked,
    LastLevel,
    Busy,
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NodePlaced(id) => write!(f, "Placed {id}"),
            Notice::Selected(Some(id)) => write!(f, "Selected {id}"),
            Notice::Selected(None) => write!(f, "Selection cleared"),
            Notice::BeamBuilt { id, cost } => write!(f, "Built {id} for ${cost}"),
            Notice::BeamRemoved { id, refund } => write!(f, "Removed {id}, refunded ${refund}"),
            Notice::BeamBroke(id) => write!(f, "{id} broke!"),
            Notice::Rejected(error) => write!(f, "{error}"),
            Notice::TestBlocked(reasons) => write!(f, "Cannot test: {}", reasons.join("; ")),
            Notice::TestStarted => write!(f, "Testing..."),
            Notice::TestStopped => write!(f, "Back to building"),
            Notice::RunFinished(outcome) if outcome.passed => {
                write!(f, "Bridge held! Score {}", outcome.score)
            }
            Notice::RunFinished(outcome) => write!(
                f,
                "{} of {} vehicles lost",
                outcome.vehicles_lost,
                outcome.vehicles_lost + outcome.vehicles_crossed
            ),
            Notice::NothingToUndo => write!(f, "Nothing to undo"),
            Notice::NothingToRedo => write!(f, "Nothing to redo"),
            Notice::Saved(id) => write!(f, "Design #{id} saved"),
            Notice::Restored(id) => write!(f, "Design #{id} restored"),
            Notice::LevelLoaded(name) => write!(f, "Level {name}"),
            Notice::LevelLocked => write!(f, "Pass this level first"),
            Notice::LastLevel => write!(f, "That was the last level"),
            Notice::Busy => write!(f, "Stop the test to keep building"),
        }
    }
}
