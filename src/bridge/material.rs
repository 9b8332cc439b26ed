/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::bridge::material::Material::*;

/// Unit costs are quoted per this many units of beam length
pub const COST_LENGTH_UNIT: f32 = 100.0;

/// Converts material elasticity into constraint compliance
const COMPLIANCE_PER_ELASTICITY: f32 = 0.002;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Wood,
    Steel,
    Cable,
    Road,
}

impl Material {
    /// Price per hundred units of length
    pub fn unit_cost(&self) -> u32 {
        match self {
            Wood => 10,
            Steel => 25,
            Cable => 15,
            Road => 20,
        }
    }

    /// Mass per unit length
    pub fn density(&self) -> f32 {
        match self {
            Wood => 0.006,
            Steel => 0.016,
            Cable => 0.002,
            Road => 0.01,
        }
    }

    /// How far the material gives under load, 0 is perfectly rigid
    pub fn elasticity(&self) -> f32 {
        match self {
            Wood => 0.3,
            Steel => 0.05,
            Cable => 0.5,
            Road => 0.2,
        }
    }

    pub fn tension_strength(&self) -> f32 {
        match self {
            Wood => 3_000.0,
            Steel => 12_000.0,
            Cable => 9_000.0,
            Road => 5_000.0,
        }
    }

    pub fn compression_strength(&self) -> f32 {
        match self {
            Wood => 2_500.0,
            Steel => 10_000.0,
            Cable => 0.0,
            Road => 4_000.0,
        }
    }

    /// Cables go slack instead of pushing back
    pub fn is_tension_only(&self) -> bool {
        matches!(self, Cable)
    }

    /// Vehicles can drive on it
    pub fn is_deck(&self) -> bool {
        matches!(self, Road | Wood)
    }

    /// Constraint compliance: stiffer material gives less displacement under load
    pub fn compliance(&self) -> f32 {
        self.elasticity() * COMPLIANCE_PER_ELASTICITY
    }

    /// Stress per unit of displacement, the inverse of compliance
    pub fn rigidity(&self) -> f32 {
        1.0 / self.compliance()
    }

    /// Cost of a beam of this material, rounded up to whole dollars.
    /// The same figure is refunded when the beam is removed.
    pub fn cost_for(&self, length: f32) -> u32 {
        (length * self.unit_cost() as f32 / COST_LENGTH_UNIT).ceil().max(0.0) as u32
    }

    pub fn mass_for(&self, length: f32) -> f32 {
        length * self.density()
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            Wood => [0.6, 0.4, 0.2, 1.0],
            Steel => [0.5, 0.55, 0.6, 1.0],
            Cable => [0.15, 0.15, 0.15, 1.0],
            Road => [0.3, 0.3, 0.3, 1.0],
        }
    }
}

/// Coarse classification of how hard a beam is working
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum StressLevel {
    Relaxed,
    Loaded,
    Strained,
    Critical,
}

impl StressLevel {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 0.5 {
            StressLevel::Relaxed
        } else if ratio < 0.75 {
            StressLevel::Loaded
        } else if ratio <= 0.9 {
            StressLevel::Strained
        } else {
            StressLevel::Critical
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            StressLevel::Relaxed => [0.2, 0.8, 0.2, 1.0],
            StressLevel::Loaded => [0.9, 0.85, 0.1, 1.0],
            StressLevel::Strained => [1.0, 0.55, 0.0, 1.0],
            StressLevel::Critical => [0.9, 0.1, 0.1, 1.0],
        }
    }
}

/// Ratio of stress to capacity, zero when there is no capacity to speak of
pub fn stress_ratio(stress: f32, max_stress: f32) -> f32 {
    if max_stress > 0.0 {
        stress / max_stress
    } else {
        0.0
    }
}

/// Overlay color for a beam carrying `stress` out of `max_stress`
pub fn stress_color(stress: f32, max_stress: f32) -> [f32; 4] {
    StressLevel::from_ratio(stress_ratio(stress, max_stress)).color()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_wood_cost_rounds_up() {
        assert_eq!(Wood.cost_for(100.0), 10);
        assert_eq!(Wood.cost_for(101.0), 11);
        assert_eq!(Steel.cost_for(100.0), 25);
        assert_eq!(Cable.cost_for(0.0), 0);
    }

    #[test]
    fn test_stiffer_material_is_less_compliant() {
        assert!(Steel.compliance() < Wood.compliance());
        assert!(Steel.rigidity() > Wood.rigidity());
        for material in Material::iter() {
            assert!((material.compliance() * material.rigidity() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_material_names() {
        assert_eq!(Material::from_str("steel"), Ok(Steel));
        assert_eq!(Material::from_str("Cable"), Ok(Cable));
        assert!(Material::from_str("unobtainium").is_err());
        assert_eq!(Road.to_string(), "road");
    }

    #[test]
    fn test_stress_levels() {
        assert_eq!(StressLevel::from_ratio(0.1), StressLevel::Relaxed);
        assert_eq!(StressLevel::from_ratio(0.6), StressLevel::Loaded);
        assert_eq!(StressLevel::from_ratio(0.9), StressLevel::Strained);
        assert_eq!(StressLevel::from_ratio(0.95), StressLevel::Critical);
        assert_eq!(stress_color(0.0, 0.0), StressLevel::Relaxed.color());
    }
}
