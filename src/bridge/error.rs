/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::fmt;

use crate::bridge::{BeamId, NodeId};
use crate::level::library::LevelName;

/// Error types that can occur while editing a bridge design
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The beam would cost more than the remaining budget
    InsufficientBudget { cost: u32, remaining: u32 },
    /// A beam refers to a node that is not in the design
    NodeNotFound(NodeId),
    /// Removing a beam that is not in the design
    BeamNotFound(BeamId),
    /// Both ends of the beam are the same node
    DegenerateBeam(NodeId),
    /// The two nodes are already joined by a beam
    DuplicateBeam(BeamId),
    /// Material name that is not in the catalog
    UnknownMaterial(String),
    /// Level name that is not in the catalog
    UnknownLevel(String),
    /// Undo, redo or restore with nothing stored
    NothingToRestore,
    /// A saved design belongs to a different level
    OtherLevel { saved: LevelName, current: LevelName },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::InsufficientBudget { cost, remaining } => {
                write!(f, "Not enough budget: beam costs ${cost}, ${remaining} left")
            }
            BridgeError::NodeNotFound(id) => write!(f, "Node {id} not found"),
            BridgeError::BeamNotFound(id) => write!(f, "Beam {id} not found"),
            BridgeError::DegenerateBeam(id) => write!(f, "Cannot connect node {id} to itself"),
            BridgeError::DuplicateBeam(id) => write!(f, "Nodes already connected by beam {id}"),
            BridgeError::UnknownMaterial(name) => write!(f, "Unknown material \"{name}\""),
            BridgeError::UnknownLevel(name) => write!(f, "Unknown level \"{name}\""),
            BridgeError::NothingToRestore => write!(f, "No saved designs"),
            BridgeError::OtherLevel { saved, current } => {
                write!(f, "That design was saved on {saved}, not on {current}")
            }
        }
    }
}

impl std::error::Error for BridgeError {}
