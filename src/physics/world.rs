/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

//! Position-based elastic world: bodies joined by compliant distance
//! constraints, vehicles resting on deck beams and ground.

use std::collections::HashMap;

use fast_inv_sqrt::InvSqrt32;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slotmap::{new_key_type, SlotMap};

use crate::bridge::{Beam, BeamId, Node, NodeId, Vehicle};
use crate::physics::{Physics, PhysicsEngine};

new_key_type! {
    pub struct BodyKey;
    pub struct ConstraintKey;
}

/// Mass every node carries before beams add their share
const NODE_MASS: f32 = 0.05;

/// How far above a surface a vehicle may have been and still land on it
const CONTACT_TOLERANCE: f32 = 2.0;

#[derive(Clone, Debug)]
struct Body {
    position: Vec2,
    previous: Vec2,
    velocity: Vec2,
    mass: f32,
    fixed: bool,
}

impl Body {
    fn new(position: Vec2, mass: f32, fixed: bool) -> Self {
        Self {
            position,
            previous: position,
            velocity: Vec2::ZERO,
            mass,
            fixed,
        }
    }

    fn inverse_mass(&self) -> f32 {
        if self.fixed || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    fn predict(&mut self, acceleration: Vec2, drag: f32, dt: f32) {
        if self.fixed {
            return;
        }
        self.velocity += acceleration * dt;
        self.velocity *= 1.0 - drag;
        self.previous = self.position;
        self.position += self.velocity * dt;
    }

    fn settle(&mut self, dt: f32) {
        if self.fixed {
            return;
        }
        self.velocity = (self.position - self.previous) / dt;
    }
}

#[derive(Clone, Debug)]
struct Constraint {
    alpha: BodyKey,
    omega: BodyKey,
    rest_length: f32,
    compliance: f32,
    tension_only: bool,
    deck: bool,
    lambda: f32,
}

impl Constraint {
    fn iterate(&mut self, bodies: &mut SlotMap<BodyKey, Body>, dt: f32) {
        let (Some(alpha), Some(omega)) = (bodies.get(self.alpha), bodies.get(self.omega)) else {
            return;
        };
        let delta = omega.position - alpha.position;
        let length_squared = delta.length_squared();
        if length_squared <= f32::EPSILON {
            return;
        }
        let extension = length_squared.sqrt() - self.rest_length;
        if self.tension_only && extension < 0.0 {
            return;
        }
        let (alpha_weight, omega_weight) = (alpha.inverse_mass(), omega.inverse_mass());
        let weight = alpha_weight + omega_weight;
        if weight <= 0.0 {
            return;
        }
        let alpha_tilde = self.compliance / (dt * dt);
        let delta_lambda = (-extension - alpha_tilde * self.lambda) / (weight + alpha_tilde);
        self.lambda += delta_lambda;
        let unit = delta * length_squared.inv_sqrt32();
        if let Some(alpha) = bodies.get_mut(self.alpha) {
            alpha.position -= unit * alpha_weight * delta_lambda;
        }
        if let Some(omega) = bodies.get_mut(self.omega) {
            omega.position += unit * omega_weight * delta_lambda;
        }
    }

    fn extension(&self, bodies: &SlotMap<BodyKey, Body>) -> Option<f32> {
        let alpha = bodies.get(self.alpha)?;
        let omega = bodies.get(self.omega)?;
        Some(alpha.position.distance(omega.position) - self.rest_length)
    }
}

/// Where along a span a vehicle touches down
#[derive(Clone, Copy, Debug)]
enum Surface {
    Ground { height: f32 },
    Deck { key: ConstraintKey, along: f32, height: f32 },
}

impl Surface {
    fn height(&self) -> f32 {
        match self {
            Surface::Ground { height } | Surface::Deck { height, .. } => *height,
        }
    }
}

/// Fraction along `from..to` at which `x` lies, if it lies within
fn span_fraction(from: Vec2, to: Vec2, x: f32) -> Option<f32> {
    let (left, right) = if from.x <= to.x { (from, to) } else { (to, from) };
    if x < left.x || x > right.x || right.x - left.x <= f32::EPSILON {
        return None;
    }
    let along = (x - from.x) / (to.x - from.x);
    Some(along.clamp(0.0, 1.0))
}

pub struct ElasticWorld {
    bodies: SlotMap<BodyKey, Body>,
    constraints: SlotMap<ConstraintKey, Constraint>,
    node_bodies: HashMap<NodeId, BodyKey>,
    beam_constraints: HashMap<BeamId, ConstraintKey>,
    vehicles: Vec<(String, BodyKey)>,
    grounds: Vec<(Vec2, Vec2)>,
    gusts: ChaCha8Rng,
    seed: u64,
    age: u64,
}

impl Default for ElasticWorld {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ElasticWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            constraints: SlotMap::with_key(),
            node_bodies: HashMap::new(),
            beam_constraints: HashMap::new(),
            vehicles: Vec::new(),
            grounds: Vec::new(),
            gusts: ChaCha8Rng::seed_from_u64(seed),
            seed,
            age: 0,
        }
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    fn ensure_body(&mut self, node: &Node) -> BodyKey {
        if let Some(key) = self.node_bodies.get(&node.id) {
            return *key;
        }
        let key = self
            .bodies
            .insert(Body::new(node.position, NODE_MASS, node.is_fixed()));
        self.node_bodies.insert(node.id.clone(), key);
        key
    }

    fn wind_acceleration(&mut self, physics: &Physics) -> Vec2 {
        if physics.wind == 0.0 {
            return Vec2::ZERO;
        }
        let swing: f32 = self.gusts.random_range(-1.0..=1.0);
        Vec2::new(physics.wind * (1.0 + physics.gust * swing), 0.0)
    }

    /// Highest surface under the vehicle that it was above a moment ago
    fn surface_below(&self, body: &Body) -> Option<Surface> {
        let x = body.position.x;
        let reachable = |height: f32| body.previous.y + CONTACT_TOLERANCE >= height;
        let grounds = self.grounds.iter().filter_map(|(from, to)| {
            let along = span_fraction(*from, *to, x)?;
            let height = from.y + (to.y - from.y) * along;
            reachable(height).then_some(Surface::Ground { height })
        });
        let decks = self
            .constraints
            .iter()
            .filter(|(_, constraint)| constraint.deck)
            .filter_map(|(key, constraint)| {
                let from = self.bodies.get(constraint.alpha)?.position;
                let to = self.bodies.get(constraint.omega)?.position;
                let along = span_fraction(from, to, x)?;
                let height = from.y + (to.y - from.y) * along;
                reachable(height).then_some(Surface::Deck { key, along, height })
            });
        grounds
            .chain(decks)
            .max_by(|a, b| a.height().total_cmp(&b.height()))
    }

    fn resolve_contacts(&mut self) {
        for (_, vehicle_key) in &self.vehicles {
            let Some(vehicle) = self.bodies.get(*vehicle_key) else {
                continue;
            };
            let Some(surface) = self.surface_below(vehicle) else {
                continue;
            };
            let penetration = surface.height() - vehicle.position.y;
            if penetration <= 0.0 {
                continue;
            }
            let vehicle_weight = vehicle.inverse_mass();
            match surface {
                Surface::Ground { height } => {
                    if let Some(vehicle) = self.bodies.get_mut(*vehicle_key) {
                        vehicle.position.y = height;
                    }
                }
                Surface::Deck { key, along, .. } => {
                    let Some(constraint) = self.constraints.get(key) else {
                        continue;
                    };
                    let (alpha_key, omega_key) = (constraint.alpha, constraint.omega);
                    let alpha_weight = self.bodies[alpha_key].inverse_mass();
                    let omega_weight = self.bodies[omega_key].inverse_mass();
                    let denominator = vehicle_weight
                        + alpha_weight * (1.0 - along).powi(2)
                        + omega_weight * along.powi(2);
                    if denominator <= 0.0 {
                        continue;
                    }
                    let correction = penetration / denominator;
                    self.bodies[*vehicle_key].position.y += vehicle_weight * correction;
                    self.bodies[alpha_key].position.y -= alpha_weight * (1.0 - along) * correction;
                    self.bodies[omega_key].position.y -= omega_weight * along * correction;
                }
            }
        }
    }
}

impl PhysicsEngine for ElasticWorld {
    fn initialize(&mut self, nodes: &[Node]) {
        self.reset();
        for node in nodes.iter().filter(|node| node.is_fixed()) {
            self.ensure_body(node);
        }
    }

    fn add_node(&mut self, node: &Node) {
        self.ensure_body(node);
    }

    fn add_beam(&mut self, beam: &Beam, start: &Node, end: &Node) {
        let alpha = self.ensure_body(start);
        let omega = self.ensure_body(end);
        let half_mass = beam.material.mass_for(beam.length) / 2.0;
        for key in [alpha, omega] {
            self.bodies[key].mass += half_mass;
        }
        let key = self.constraints.insert(Constraint {
            alpha,
            omega,
            rest_length: beam.length,
            compliance: beam.material.compliance(),
            tension_only: beam.material.is_tension_only(),
            deck: beam.material.is_deck(),
            lambda: 0.0,
        });
        if let Some(replaced) = self.beam_constraints.insert(beam.id.clone(), key) {
            self.constraints.remove(replaced);
        }
    }

    fn remove_beam(&mut self, id: &BeamId) {
        if let Some(key) = self.beam_constraints.remove(id) {
            self.constraints.remove(key);
        }
    }

    fn add_vehicle(&mut self, vehicle: &Vehicle) {
        let mut body = Body::new(vehicle.position, vehicle.weight, false);
        body.velocity = vehicle.velocity;
        let key = self.bodies.insert(body);
        self.vehicles.push((vehicle.id.clone(), key));
    }

    fn add_ground(&mut self, from: Vec2, to: Vec2) {
        self.grounds.push((from, to));
    }

    fn calculate_stress(&self, id: &BeamId) -> f32 {
        let Some(constraint) = self
            .beam_constraints
            .get(id)
            .and_then(|key| self.constraints.get(*key))
        else {
            return 0.0;
        };
        match constraint.extension(&self.bodies) {
            Some(extension) if constraint.tension_only && extension < 0.0 => 0.0,
            Some(extension) => extension.abs() / constraint.compliance,
            None => 0.0,
        }
    }

    fn step(&mut self, physics: &Physics) {
        let dt = physics.substep_seconds();
        let gravity = Vec2::new(0.0, -physics.gravity);
        let wind = self.wind_acceleration(physics);
        let vehicle_keys: Vec<BodyKey> = self.vehicles.iter().map(|(_, key)| *key).collect();
        for _ in 0..physics.iterations.max(1) {
            for (key, body) in self.bodies.iter_mut() {
                if vehicle_keys.contains(&key) {
                    body.predict(gravity, 0.0, dt);
                } else {
                    body.predict(gravity + wind, physics.drag, dt);
                }
            }
            for constraint in self.constraints.values_mut() {
                constraint.lambda = 0.0;
            }
            let keys: Vec<ConstraintKey> = self.constraints.keys().collect();
            for key in keys {
                if let Some(constraint) = self.constraints.get_mut(key) {
                    constraint.iterate(&mut self.bodies, dt);
                }
            }
            self.resolve_contacts();
            for body in self.bodies.values_mut() {
                body.settle(dt);
            }
        }
        self.age += 1;
    }

    fn node_position(&self, id: &NodeId) -> Option<Vec2> {
        let key = self.node_bodies.get(id)?;
        self.bodies.get(*key).map(|body| body.position)
    }

    fn vehicle_positions(&self) -> Vec<(String, Vec2)> {
        self.vehicles
            .iter()
            .filter_map(|(id, key)| Some((id.clone(), self.bodies.get(*key)?.position)))
            .collect()
    }

    fn reset(&mut self) {
        self.bodies.clear();
        self.constraints.clear();
        self.node_bodies.clear();
        self.beam_constraints.clear();
        self.vehicles.clear();
        self.grounds.clear();
        self.gusts = ChaCha8Rng::seed_from_u64(self.seed);
        self.age = 0;
    }
}
