/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPACING: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Grid {
    Off,
    Square { spacing: f32 },
    /// Triangular lattice, every other row shifted by half a spacing
    Isometric { spacing: f32 },
}

impl Default for Grid {
    fn default() -> Self {
        Grid::Square {
            spacing: DEFAULT_SPACING,
        }
    }
}

impl Grid {
    pub fn snap(&self, point: Vec2) -> Vec2 {
        match *self {
            Grid::Off => point,
            Grid::Square { spacing } => (point / spacing).round() * spacing,
            Grid::Isometric { spacing } => {
                let row_height = spacing * 3f32.sqrt() / 2.0;
                let row = (point.y / row_height).round();
                // the two nearest rows can both hold the closest lattice point
                [row - 1.0, row, row + 1.0]
                    .into_iter()
                    .map(|row| {
                        let offset = if (row as i64).rem_euclid(2) == 1 {
                            spacing / 2.0
                        } else {
                            0.0
                        };
                        let x = ((point.x - offset) / spacing).round() * spacing + offset;
                        Vec2::new(x, row * row_height)
                    })
                    .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
                    .unwrap_or(point)
            }
        }
    }
}
