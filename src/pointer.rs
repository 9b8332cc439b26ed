/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use glam::Vec2;

use crate::bridge::grid::Grid;
use crate::bridge::{BeamId, Design, NodeId};

/// How close a click has to be to grab a node or beam
pub const PICK_RADIUS: f32 = 8.0;

/// What lies under the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum Pick {
    Node(NodeId),
    Beam(BeamId),
    /// Nothing there, with the point snapped to the grid
    Empty(Vec2),
}

/// Nodes win over beams, the closest of each wins within the radius
pub fn pick(design: &Design, grid: &Grid, point: Vec2, radius: f32) -> Pick {
    if let Some(node) = nearest_node(design, point, radius) {
        return Pick::Node(node);
    }
    let beam = design
        .beams
        .iter()
        .filter_map(|beam| {
            let start = design.node(&beam.start)?.position;
            let end = design.node(&beam.end)?.position;
            let distance = distance_to_segment(point, start, end);
            (distance <= radius).then_some((distance, &beam.id))
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b));
    if let Some((_, id)) = beam {
        return Pick::Beam(id.clone());
    }
    let snapped = grid.snap(point);
    match nearest_node(design, snapped, f32::EPSILON.max(radius * 0.01)) {
        Some(node) => Pick::Node(node),
        None => Pick::Empty(snapped),
    }
}

fn nearest_node(design: &Design, point: Vec2, radius: f32) -> Option<NodeId> {
    design
        .nodes
        .iter()
        .map(|node| (node.position.distance(point), &node.id))
        .filter(|(distance, _)| *distance <= radius)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, id)| id.clone())
}

pub fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(start);
    }
    let along = ((point - start).dot(span) / length_squared).clamp(0.0, 1.0);
    point.distance(start + span * along)
}
