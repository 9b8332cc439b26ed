/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use glam::Vec2;
use strum::{Display, EnumIter, EnumString};

use crate::bridge::{Beam, BeamId, Node, NodeId, Vehicle};

pub mod world;

/// Simulated seconds per animation frame
pub const FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Everything the game asks of a physics engine. Nodes, beams and vehicles
/// go in as design records; only positions and stress come back out.
pub trait PhysicsEngine {
    /// Start over with a fixed body for every fixed or anchor node
    fn initialize(&mut self, nodes: &[Node]);

    fn add_node(&mut self, node: &Node);

    /// Connect two bodies, creating movable bodies for nodes not yet present
    fn add_beam(&mut self, beam: &Beam, start: &Node, end: &Node);

    /// Drop the beam's constraint. Bodies stay.
    fn remove_beam(&mut self, id: &BeamId);

    fn add_vehicle(&mut self, vehicle: &Vehicle);

    /// Static surface vehicles can drive on
    fn add_ground(&mut self, from: Vec2, to: Vec2);

    /// Displacement from rest length times rigidity, zero for unknown beams
    fn calculate_stress(&self, id: &BeamId) -> f32;

    /// Advance one animation frame
    fn step(&mut self, physics: &Physics);

    fn node_position(&self, id: &NodeId) -> Option<Vec2>;

    fn vehicle_positions(&self) -> Vec<(String, Vec2)>;

    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum PhysicsFeature {
    Gravity,
    Drag,
    Wind,
    Gust,
    Iterations,
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicsParameter {
    pub feature: PhysicsFeature,
    pub value: f32,
}

impl PhysicsFeature {
    pub fn parameter(self, value: f32) -> PhysicsParameter {
        PhysicsParameter {
            feature: self,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    pub gravity: f32,
    pub drag: f32,
    /// Steady sideways push on free bodies
    pub wind: f32,
    /// Fraction by which the wind varies from frame to frame
    pub gust: f32,
    /// Solver substeps per frame
    pub iterations: usize,
    pub seed: u64,
}

impl Default for Physics {
    fn default() -> Self {
        presets::DEFAULT
    }
}

impl Physics {
    pub fn accept(&mut self, parameter: PhysicsParameter) {
        use PhysicsFeature::*;
        let PhysicsParameter { feature, value } = parameter;
        match feature {
            Gravity => self.gravity = value,
            Drag => self.drag = value,
            Wind => self.wind = value,
            Gust => self.gust = value,
            Iterations => self.iterations = value.max(1.0) as usize,
        }
    }

    pub fn with_wind(&self, wind: Option<f32>) -> Self {
        let mut physics = self.clone();
        if let Some(wind) = wind {
            physics.accept(PhysicsFeature::Wind.parameter(wind));
        }
        physics
    }

    pub fn substep_seconds(&self) -> f32 {
        FRAME_SECONDS / self.iterations.max(1) as f32
    }
}

pub mod presets {
    use crate::physics::Physics;

    pub const DEFAULT: Physics = Physics {
        gravity: 98.1,
        drag: 0.0005,
        wind: 0.0,
        gust: 0.3,
        iterations: 20,
        seed: 1,
    };

    pub const GENTLE: Physics = Physics {
        gravity: 49.0,
        drag: 0.002,
        wind: 0.0,
        gust: 0.0,
        iterations: 20,
        seed: 1,
    };

    pub const STORMY: Physics = Physics {
        gravity: 98.1,
        drag: 0.0005,
        wind: 15.0,
        gust: 0.8,
        iterations: 30,
        seed: 7,
    };

    pub fn by_name(name: &str) -> Option<Physics> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(DEFAULT),
            "gentle" => Some(GENTLE),
            "stormy" => Some(STORMY),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_parameters() {
        let mut physics = Physics::default();
        physics.accept(PhysicsFeature::Gravity.parameter(10.0));
        physics.accept(PhysicsFeature::Iterations.parameter(0.0));
        assert_eq!(physics.gravity, 10.0);
        assert_eq!(physics.iterations, 1);
    }

    #[test]
    fn test_level_wind_overrides_preset() {
        let physics = presets::STORMY.with_wind(Some(3.0));
        assert_eq!(physics.wind, 3.0);
        assert_eq!(presets::STORMY.with_wind(None).wind, presets::STORMY.wind);
    }
}
