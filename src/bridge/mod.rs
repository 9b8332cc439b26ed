/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bridge::error::BridgeError;
use crate::bridge::material::Material;

pub mod budget;
pub mod error;
pub mod grid;
pub mod history;
pub mod material;
pub mod scoring;
pub mod validation;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeamId(pub String);

impl Display for BeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BeamId {
    fn from(value: &str) -> Self {
        BeamId(value.to_string())
    }
}

/// A point of the structure. Anchors are always fixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Vec2,
    fixed: bool,
    anchor: bool,
}

impl Node {
    pub fn free(id: NodeId, position: Vec2) -> Self {
        Self {
            id,
            position,
            fixed: false,
            anchor: false,
        }
    }

    /// Immovable support that is not a crossing endpoint
    pub fn fixed(id: NodeId, position: Vec2) -> Self {
        Self {
            id,
            position,
            fixed: true,
            anchor: false,
        }
    }

    pub fn anchor(id: NodeId, position: Vec2) -> Self {
        Self {
            id,
            position,
            fixed: true,
            anchor: true,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_anchor(&self) -> bool {
        self.anchor
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: BeamId,
    pub start: NodeId,
    pub end: NodeId,
    pub material: Material,
    /// Distance between the nodes when the beam was built, never re-derived
    pub length: f32,
    pub stress: f32,
    pub max_stress: f32,
    pub cost: u32,
    pub broken: bool,
}

impl Beam {
    pub fn new(id: BeamId, start: &Node, end: &Node, material: Material) -> Self {
        let length = start.position.distance(end.position);
        Self {
            id,
            start: start.id.clone(),
            end: end.id.clone(),
            material,
            length,
            stress: 0.0,
            max_stress: material.tension_strength(),
            cost: material.cost_for(length),
            broken: false,
        }
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        self.start == *node || self.end == *node
    }

    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (self.start == *a && self.end == *b) || (self.start == *b && self.end == *a)
    }
}

/// Template for a vehicle crossing the bridge, taken from the level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub position: Vec2,
    pub weight: f32,
    pub velocity: Vec2,
}

impl Vehicle {
    pub fn new(id: &str, position: Vec2, weight: f32, velocity: Vec2) -> Self {
        Self {
            id: id.to_string(),
            position,
            weight,
            velocity,
        }
    }
}

/// The nodes and beams of a bridge. Every field is owned, so a clone
/// is a complete value copy that shares nothing with the original.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub nodes: Vec<Node>,
    pub beams: Vec<Beam>,
    next_id: usize,
}

impl Design {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            beams: Vec::new(),
            next_id: 0,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    pub fn beam(&self, id: &BeamId) -> Option<&Beam> {
        self.beams.iter().find(|beam| beam.id == *id)
    }

    pub fn joining(&self, a: &NodeId, b: &NodeId) -> Option<&Beam> {
        self.beams.iter().find(|beam| beam.joins(a, b))
    }

    pub fn total_cost(&self) -> u32 {
        self.beams.iter().map(|beam| beam.cost).sum()
    }

    pub fn place_node(&mut self, position: Vec2) -> NodeId {
        let id = NodeId(format!("node-{}", self.create_id()));
        self.nodes.push(Node::free(id.clone(), position));
        id
    }

    /// Build a beam between two existing nodes. The `pay` callback sees the
    /// cost before anything changes; if it refuses, the design is untouched.
    pub fn create_beam(
        &mut self,
        start: &NodeId,
        end: &NodeId,
        material: Material,
        pay: impl FnOnce(u32) -> Result<(), BridgeError>,
    ) -> Result<BeamId, BridgeError> {
        if start == end {
            return Err(BridgeError::DegenerateBeam(start.clone()));
        }
        if let Some(existing) = self.joining(start, end) {
            return Err(BridgeError::DuplicateBeam(existing.id.clone()));
        }
        let start_node = self
            .node(start)
            .ok_or_else(|| BridgeError::NodeNotFound(start.clone()))?;
        let end_node = self
            .node(end)
            .ok_or_else(|| BridgeError::NodeNotFound(end.clone()))?;
        let id = BeamId(format!("beam-{}", self.next_id));
        let beam = Beam::new(id.clone(), start_node, end_node, material);
        pay(beam.cost)?;
        self.next_id += 1;
        self.beams.push(beam);
        Ok(id)
    }

    /// Take a beam out, along with any free node it leaves unconnected
    pub fn remove_beam(&mut self, id: &BeamId) -> Result<Beam, BridgeError> {
        let index = self
            .beams
            .iter()
            .position(|beam| beam.id == *id)
            .ok_or_else(|| BridgeError::BeamNotFound(id.clone()))?;
        let removed = self.beams.remove(index);
        for end in [&removed.start, &removed.end] {
            let orphan = !self.beams.iter().any(|beam| beam.touches(end));
            if orphan {
                self.nodes.retain(|node| node.is_fixed() || node.id != *end);
            }
        }
        Ok(removed)
    }

    /// Undirected adjacency over the beams, keyed by node id
    pub fn adjacency(beams: &[Beam]) -> HashMap<&NodeId, Vec<&NodeId>> {
        let mut adjacent: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for beam in beams {
            adjacent.entry(&beam.start).or_default().push(&beam.end);
            adjacent.entry(&beam.end).or_default().push(&beam.start);
        }
        adjacent
    }

    pub fn clear_stresses(&mut self) {
        for beam in &mut self.beams {
            beam.stress = 0.0;
            beam.broken = false;
        }
    }

    fn create_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::budget::Budget;

    fn two_anchors() -> Design {
        Design::new(vec![
            Node::anchor("left".into(), Vec2::new(0.0, 0.0)),
            Node::anchor("right".into(), Vec2::new(300.0, 0.0)),
        ])
    }

    #[test]
    fn test_anchor_is_fixed() {
        let node = Node::anchor("a".into(), Vec2::ZERO);
        assert!(node.is_fixed() && node.is_anchor());
        assert!(!Node::free("b".into(), Vec2::ZERO).is_fixed());
    }

    #[test]
    fn test_beam_cost_and_length() {
        let mut design = two_anchors();
        let middle = design.place_node(Vec2::new(100.0, 0.0));
        let mut budget = Budget::new(500);
        let id = design
            .create_beam(&"left".into(), &middle, Material::Wood, |cost| budget.charge(cost))
            .unwrap();
        let beam = design.beam(&id).unwrap();
        assert_eq!(beam.length, 100.0);
        assert_eq!(beam.cost, 10);
        assert_eq!(beam.max_stress, Material::Wood.tension_strength());
        assert_eq!(budget.remaining, 490);
    }

    #[test]
    fn test_refused_payment_creates_nothing() {
        let mut design = two_anchors();
        let mut budget = Budget::new(5);
        let result = design.create_beam(&"left".into(), &"right".into(), Material::Steel, |cost| {
            budget.charge(cost)
        });
        assert!(matches!(result, Err(BridgeError::InsufficientBudget { .. })));
        assert!(design.beams.is_empty());
        assert_eq!(budget.remaining, 5);
    }

    #[test]
    fn test_missing_and_degenerate_references() {
        let mut design = two_anchors();
        let free = |_| Ok(());
        assert_eq!(
            design.create_beam(&"left".into(), &"left".into(), Material::Wood, free),
            Err(BridgeError::DegenerateBeam("left".into()))
        );
        assert_eq!(
            design.create_beam(&"left".into(), &"nowhere".into(), Material::Wood, free),
            Err(BridgeError::NodeNotFound("nowhere".into()))
        );
        assert_eq!(
            design.remove_beam(&"beam-99".into()),
            Err(BridgeError::BeamNotFound("beam-99".into()))
        );
    }

    #[test]
    fn test_duplicate_beam_rejected() {
        let mut design = two_anchors();
        let id = design
            .create_beam(&"left".into(), &"right".into(), Material::Wood, |_| Ok(()))
            .unwrap();
        assert_eq!(
            design.create_beam(&"right".into(), &"left".into(), Material::Steel, |_| Ok(())),
            Err(BridgeError::DuplicateBeam(id))
        );
    }

    #[test]
    fn test_remove_beam_prunes_orphans() {
        let mut design = two_anchors();
        let middle = design.place_node(Vec2::new(150.0, 10.0));
        let a = design
            .create_beam(&"left".into(), &middle, Material::Wood, |_| Ok(()))
            .unwrap();
        let b = design
            .create_beam(&middle, &"right".into(), Material::Wood, |_| Ok(()))
            .unwrap();
        design.remove_beam(&a).unwrap();
        assert!(design.node(&middle).is_some());
        design.remove_beam(&b).unwrap();
        assert!(design.node(&middle).is_none());
        assert_eq!(design.nodes.len(), 2);
    }

    #[test]
    fn test_clone_shares_nothing() {
        let mut design = two_anchors();
        design
            .create_beam(&"left".into(), &"right".into(), Material::Wood, |_| Ok(()))
            .unwrap();
        let copy = design.clone();
        design.beams[0].stress = 99.0;
        design.nodes[0].position.x = -50.0;
        assert_eq!(copy.beams[0].stress, 0.0);
        assert_eq!(copy.nodes[0].position.x, 0.0);
    }
}
