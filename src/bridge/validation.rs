/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

//! Structural checklist for a bridge design.
//!
//! Every rule is evaluated independently and the findings are collected in
//! rule order. Only an empty structure is an error; everything else is advice
//! that leaves the test action available.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::bridge::{Beam, BeamId, Design, Node, NodeId, Vehicle};

/// Beams working harder than this fraction of capacity are reported
pub const OVERSTRESS_RATIO: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    NoBeams,
    Disconnected,
    Overstressed,
    UnsupportedNodes,
    NoVehicles,
}

/// One line of the checklist, with the elements to highlight on demand
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
    pub node_ids: Vec<NodeId>,
    pub beam_ids: Vec<BeamId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeValidation {
    pub is_valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl BridgeValidation {
    pub fn has(&self, kind: FindingKind) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|finding| finding.kind == kind)
    }

    pub fn finding(&self, kind: FindingKind) -> Option<&Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .find(|finding| finding.kind == kind)
    }
}

pub fn validate(nodes: &[Node], beams: &[Beam], vehicles: &[Vehicle]) -> BridgeValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let anchors: Vec<&Node> = nodes.iter().filter(|node| node.is_anchor()).collect();

    if beams.is_empty() {
        errors.push(Finding {
            kind: FindingKind::NoBeams,
            message: "Build at least one beam before testing".to_string(),
            node_ids: anchors.iter().map(|node| node.id.clone()).collect(),
            beam_ids: Vec::new(),
        });
    }

    if let (Some(first), Some(last)) = (anchors.first(), anchors.last()) {
        if anchors.len() >= 2 && !connected(beams, &first.id, &last.id) {
            warnings.push(Finding {
                kind: FindingKind::Disconnected,
                message: format!("No path of beams joins {} and {}", first.id, last.id),
                node_ids: vec![first.id.clone(), last.id.clone()],
                beam_ids: Vec::new(),
            });
        }
    }

    let overstressed: Vec<BeamId> = beams
        .iter()
        .filter(|beam| beam.max_stress > 0.0 && beam.stress / beam.max_stress > OVERSTRESS_RATIO)
        .map(|beam| beam.id.clone())
        .collect();
    if !overstressed.is_empty() {
        warnings.push(Finding {
            kind: FindingKind::Overstressed,
            message: format!("{} beam(s) near breaking point", overstressed.len()),
            node_ids: Vec::new(),
            beam_ids: overstressed,
        });
    }

    let unsupported: Vec<NodeId> = nodes
        .iter()
        .filter(|node| !node.is_fixed() && !beams.iter().any(|beam| beam.touches(&node.id)))
        .map(|node| node.id.clone())
        .collect();
    if !unsupported.is_empty() {
        warnings.push(Finding {
            kind: FindingKind::UnsupportedNodes,
            message: format!("{} node(s) not attached to any beam", unsupported.len()),
            node_ids: unsupported,
            beam_ids: Vec::new(),
        });
    }

    if vehicles.is_empty() {
        warnings.push(Finding {
            kind: FindingKind::NoVehicles,
            message: "This level has no vehicles to test with".to_string(),
            node_ids: Vec::new(),
            beam_ids: Vec::new(),
        });
    }

    BridgeValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

pub fn validate_design(design: &Design, vehicles: &[Vehicle]) -> BridgeValidation {
    validate(&design.nodes, &design.beams, vehicles)
}

/// Breadth-first reachability over beams treated as undirected edges
pub fn connected(beams: &[Beam], from: &NodeId, to: &NodeId) -> bool {
    if from == to {
        return true;
    }
    let adjacent = Design::adjacency(beams);
    let mut visited: HashSet<&NodeId> = HashSet::from([from]);
    let mut queue: VecDeque<&NodeId> = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        for &next in adjacent.get(current).into_iter().flatten() {
            if next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
