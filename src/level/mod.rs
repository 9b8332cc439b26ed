/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::bridge::{Node, Vehicle};
use crate::level::library::LevelName;

pub mod library;

/// How far the approach roads reach beyond the anchors
const APPROACH_LENGTH: f32 = 400.0;

/// Vehicles must pass the last anchor by this much to count as crossed
const FINISH_MARGIN: f32 = 20.0;

/// Cosmetic water under the bridge
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub width: f32,
    pub depth: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Day,
    Dusk,
    Night,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub name: LevelName,
    pub title: &'static str,
    pub description: &'static str,
    pub budget: u32,
    pub nodes: Vec<Node>,
    pub vehicles: Vec<Vehicle>,
    pub wind: Option<f32>,
    pub river: Option<River>,
    pub theme: Option<Theme>,
}

impl Level {
    fn anchor_span(&self) -> Option<(Vec2, Vec2)> {
        let mut anchors = self.nodes.iter().filter(|node| node.is_anchor());
        let first = anchors.next()?.position;
        let (left, right) = anchors.fold((first, first), |(left, right), node| {
            let p = node.position;
            (
                if p.x < left.x { p } else { left },
                if p.x > right.x { p } else { right },
            )
        });
        Some((left, right))
    }

    /// Approach roads leading to the outermost anchors
    pub fn grounds(&self) -> Vec<(Vec2, Vec2)> {
        match self.anchor_span() {
            None => Vec::new(),
            Some((left, right)) => vec![
                (left - Vec2::new(APPROACH_LENGTH, 0.0), left),
                (right, right + Vec2::new(APPROACH_LENGTH, 0.0)),
            ],
        }
    }

    /// X a vehicle has to reach to have crossed
    pub fn finish_line(&self) -> f32 {
        self.anchor_span()
            .map(|(_, right)| right.x + FINISH_MARGIN)
            .unwrap_or(0.0)
    }

    /// Vehicles below this have fallen
    pub fn fall_line(&self) -> f32 {
        let lowest = self
            .nodes
            .iter()
            .map(|node| node.position.y)
            .fold(0.0f32, f32::min);
        let depth = self.river.map(|river| river.depth).unwrap_or(100.0);
        lowest - depth
    }
}
