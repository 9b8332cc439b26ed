/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use crate::bridge::Beam;

const BASE_SCORE: f32 = 100.0;
const BUDGET_BONUS: f32 = 200.0;
const EFFICIENT_BEAM_BONUS: f32 = 10.0;
const VEHICLE_BONUS: f32 = 50.0;

/// Utilisation band that counts as efficient use of material, exclusive at both ends
const EFFICIENT_RATIO: (f32, f32) = (0.3, 0.8);

pub fn score(beams: &[Beam], budget_used: u32, total_budget: u32, vehicles_crossed: usize) -> i64 {
    let budget_bonus = if total_budget == 0 {
        0.0
    } else {
        let saved = (total_budget as f32 - budget_used as f32) / total_budget as f32;
        saved.max(0.0) * BUDGET_BONUS
    };
    let (low, high) = EFFICIENT_RATIO;
    let efficient = beams
        .iter()
        .filter(|beam| beam.max_stress > 0.0)
        .map(|beam| beam.stress / beam.max_stress)
        .filter(|ratio| *ratio > low && *ratio < high)
        .count();
    let total = BASE_SCORE
        + budget_bonus
        + efficient as f32 * EFFICIENT_BEAM_BONUS
        + vehicles_crossed as f32 * VEHICLE_BONUS;
    total.round() as i64
}
