/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::collections::HashSet;

use glam::Vec2;

use crate::bridge::budget::Budget;
use crate::bridge::error::BridgeError;
use crate::bridge::grid::Grid;
use crate::bridge::history::{DesignSnapshot, History, SavedDesigns, HISTORY_CAPACITY, SAVED_DESIGNS_CAPACITY};
use crate::bridge::material::{stress_color, Material};
use crate::bridge::scoring::score;
use crate::bridge::validation::{validate_design, BridgeValidation, FindingKind};
use crate::bridge::{BeamId, Design, NodeId};
use crate::level::library::LevelName;
use crate::level::Level;
use crate::physics::world::ElasticWorld;
use crate::physics::{Physics, PhysicsEngine};
use crate::pointer::{pick, Pick, PICK_RADIUS};
use crate::{Action, Age, Notice, Outcome};

/// Span covered by one deck beam of the demonstration truss
const DEMO_SEGMENT: f32 = 100.0;

/// Height of the demonstration truss apexes above the deck
const DEMO_TRUSS_HEIGHT: f32 = 60.0;

/// Flags and counters of the session. Every change makes a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub level: LevelName,
    pub paused: bool,
    pub show_tutorial: bool,
    pub material: Material,
    pub budget: Budget,
    pub score: i64,
    pub zen: bool,
    pub delete_mode: bool,
    pub stress_overlay: bool,
    pub level_passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    SetLevel(LevelName),
    SetPaused(bool),
    DismissTutorial,
    SelectMaterial(Material),
    SetBudget(Budget),
    SetScore(i64),
    SetPassed(bool),
    ToggleZen,
    ToggleDeleteMode,
    ToggleStressOverlay,
}

impl GameState {
    pub fn new(level: LevelName) -> Self {
        Self {
            level,
            paused: false,
            show_tutorial: level.index() == 0,
            material: Material::default(),
            budget: Budget::new(level.level().budget),
            score: 0,
            zen: false,
            delete_mode: false,
            stress_overlay: false,
            level_passed: false,
        }
    }

    pub fn apply(&self, change: StateChange) -> GameState {
        use StateChange::*;
        let mut next = self.clone();
        match change {
            SetLevel(level) => {
                next = GameState {
                    zen: self.zen,
                    material: self.material,
                    stress_overlay: self.stress_overlay,
                    ..GameState::new(level)
                };
            }
            SetPaused(paused) => next.paused = paused,
            DismissTutorial => next.show_tutorial = false,
            SelectMaterial(material) => next.material = material,
            SetBudget(budget) => next.budget = budget,
            SetScore(score) => next.score = score,
            SetPassed(passed) => next.level_passed = passed,
            ToggleZen => next.zen = !self.zen,
            ToggleDeleteMode => next.delete_mode = !self.delete_mode,
            ToggleStressOverlay => next.stress_overlay = !self.stress_overlay,
        }
        next
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub physics: Physics,
    pub grid: Grid,
    pub history_capacity: usize,
    pub saved_capacity: usize,
    pub pick_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: Physics::default(),
            grid: Grid::default(),
            history_capacity: HISTORY_CAPACITY,
            saved_capacity: SAVED_DESIGNS_CAPACITY,
            pick_radius: PICK_RADIUS,
        }
    }
}

/// Bookkeeping for a test in progress
#[derive(Debug, Clone)]
pub struct SimulationRun {
    age: Age,
    vehicles: usize,
    crossed: HashSet<String>,
    lost: HashSet<String>,
    broken: Vec<BeamId>,
    finish_line: f32,
    fall_line: f32,
}

impl SimulationRun {
    pub fn new(level: &Level) -> Self {
        Self {
            age: Age::default(),
            vehicles: level.vehicles.len(),
            crossed: HashSet::new(),
            lost: HashSet::new(),
            broken: Vec::new(),
            finish_line: level.finish_line(),
            fall_line: level.fall_line(),
        }
    }

    /// Sort vehicles into crossed and lost, true once all are one or the other
    pub fn observe(&mut self, positions: &[(String, Vec2)]) -> bool {
        for (id, position) in positions {
            if self.crossed.contains(id) || self.lost.contains(id) {
                continue;
            }
            if position.y < self.fall_line {
                self.lost.insert(id.clone());
            } else if position.x > self.finish_line {
                self.crossed.insert(id.clone());
            }
        }
        self.crossed.len() + self.lost.len() >= self.vehicles
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn crossed(&self) -> usize {
        self.crossed.len()
    }

    pub fn lost(&self) -> usize {
        self.lost.len()
    }
}

pub struct Game<E: PhysicsEngine = ElasticWorld> {
    state: GameState,
    design: Design,
    history: History,
    saved: SavedDesigns,
    engine: E,
    config: GameConfig,
    selected: Option<NodeId>,
    run: Option<SimulationRun>,
    outcome: Option<Outcome>,
    validation: BridgeValidation,
    highlight: Option<FindingKind>,
}

impl Game<ElasticWorld> {
    pub fn new(level: LevelName, config: GameConfig) -> Self {
        let engine = ElasticWorld::new(config.physics.seed);
        Self::with_engine(level, config, engine)
    }
}

impl<E: PhysicsEngine> Game<E> {
    pub fn with_engine(level: LevelName, config: GameConfig, engine: E) -> Self {
        let state = GameState::new(level);
        let design = Design::new(level.level().nodes.clone());
        let validation = validate_design(&design, &level.level().vehicles);
        let mut game = Self {
            state,
            design,
            history: History::new(level, config.history_capacity),
            saved: SavedDesigns::new(config.saved_capacity),
            engine,
            config,
            selected: None,
            run: None,
            outcome: None,
            validation,
            highlight: None,
        };
        game.rebuild_engine();
        log::info!("Loaded level {level}");
        game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn level(&self) -> &'static Level {
        self.state.level.level()
    }

    pub fn validation(&self) -> &BridgeValidation {
        &self.validation
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn is_testing(&self) -> bool {
        self.run.is_some()
    }

    pub fn run(&self) -> Option<&SimulationRun> {
        self.run.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn saved_designs(&self) -> &SavedDesigns {
        &self.saved
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Where a node is drawn: the engine owns positions while testing
    pub fn node_position(&self, id: &NodeId) -> Option<Vec2> {
        if self.run.is_some() {
            if let Some(position) = self.engine.node_position(id) {
                return Some(position);
            }
        }
        self.design.node(id).map(|node| node.position)
    }

    pub fn vehicle_positions(&self) -> Vec<(String, Vec2)> {
        self.engine.vehicle_positions()
    }

    /// Stress colours with the overlay on, material colours otherwise
    pub fn beam_colors(&self) -> Vec<(BeamId, [f32; 4])> {
        self.design
            .beams
            .iter()
            .map(|beam| {
                let color = if self.state.stress_overlay {
                    stress_color(beam.stress, beam.max_stress)
                } else {
                    beam.material.color()
                };
                (beam.id.clone(), color)
            })
            .collect()
    }

    /// Nodes and beams named by the highlighted checklist entry
    pub fn highlighted(&self) -> (Vec<NodeId>, Vec<BeamId>) {
        self.highlight
            .and_then(|kind| self.validation.finding(kind))
            .map(|finding| (finding.node_ids.clone(), finding.beam_ids.clone()))
            .unwrap_or_default()
    }

    pub fn perform(&mut self, action: Action) -> Vec<Notice> {
        use Action::*;
        let editing = matches!(
            action,
            Click(_) | Undo | Redo | RestoreDesign(_) | ToggleDeleteMode
        );
        if editing && self.run.is_some() {
            return vec![Notice::Busy];
        }
        if editing {
            self.clear_run_marks();
        }
        match action {
            Click(point) => self.click(point),
            SelectMaterial(material) => {
                self.change(StateChange::SelectMaterial(material));
                Vec::new()
            }
            Test => self.start_test(),
            StopTest => self.stop_test(),
            Reset => self.reset_level(),
            ToggleDeleteMode => {
                self.selected = None;
                self.change(StateChange::ToggleDeleteMode);
                Vec::new()
            }
            Undo => self.undo(),
            Redo => self.redo(),
            SaveDesign(label) => vec![Notice::Saved(self.save_design(&label))],
            RestoreDesign(id) => self.restore_design(id),
            ToggleStressOverlay => {
                self.change(StateChange::ToggleStressOverlay);
                Vec::new()
            }
            ToggleZen => self.toggle_zen(),
            TogglePause => {
                let paused = !self.state.paused;
                self.change(StateChange::SetPaused(paused));
                Vec::new()
            }
            AdvanceLevel => self.advance_level(),
            DismissTutorial => {
                self.change(StateChange::DismissTutorial);
                Vec::new()
            }
            Highlight(kind) => {
                self.highlight = kind;
                Vec::new()
            }
        }
    }

    /// One animation frame of the test in progress
    pub fn frame(&mut self) -> Vec<Notice> {
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };
        if self.state.paused {
            return Vec::new();
        }
        let physics = self.config.physics.with_wind(self.state.level.level().wind);
        self.engine.step(&physics);
        run.age.tick();
        let mut notices = Vec::new();
        for beam in self.design.beams.iter_mut().filter(|beam| !beam.broken) {
            beam.stress = self.engine.calculate_stress(&beam.id);
            if beam.stress > beam.max_stress {
                beam.broken = true;
                self.engine.remove_beam(&beam.id);
                run.broken.push(beam.id.clone());
                log::debug!("{} broke at stress {:.0}", beam.id, beam.stress);
                notices.push(Notice::BeamBroke(beam.id.clone()));
            }
        }
        let finished = run.observe(&self.engine.vehicle_positions());
        self.validation = validate_design(&self.design, &self.level().vehicles);
        if finished {
            notices.push(self.finish_run());
        }
        notices
    }

    /// Lay a deck from the first anchor to the last and stiffen it with a
    /// steel Warren truss above, one click per joint like a player would.
    /// None when a click did not leave the expected selection.
    pub fn build_demo_truss(&mut self, deck_material: Material) -> Option<()> {
        let mut anchors: Vec<Vec2> = self
            .level()
            .nodes
            .iter()
            .filter(|node| node.is_anchor())
            .map(|node| node.position)
            .collect();
        anchors.sort_by(|a, b| a.x.total_cmp(&b.x));
        let (left, right) = (*anchors.first()?, *anchors.last()?);
        let segments = ((right.x - left.x) / DEMO_SEGMENT).round().max(1.0) as usize;

        self.perform(Action::SelectMaterial(deck_material));
        let mut deck = vec![self.click_select(left)?];
        for step in 1..=segments {
            deck.push(self.click_select(left.lerp(right, step as f32 / segments as f32))?);
        }
        self.deselect();

        self.perform(Action::SelectMaterial(Material::Steel));
        self.click_select(deck[0])?;
        let mut apexes = Vec::new();
        for pair in deck.windows(2) {
            let apex = (pair[0] + pair[1]) / 2.0 + Vec2::new(0.0, DEMO_TRUSS_HEIGHT);
            apexes.push(self.click_select(apex)?);
            self.click_select(pair[1])?;
        }
        self.deselect();
        for apex in apexes {
            self.click_select(apex)?;
        }
        self.deselect();
        Some(())
    }

    /// Click, then tell where the selected node ended up after snapping
    fn click_select(&mut self, point: Vec2) -> Option<Vec2> {
        for notice in self.perform(Action::Click(point)) {
            log::debug!("{notice}");
        }
        let selected = self.selected.as_ref()?;
        self.design.node(selected).map(|node| node.position)
    }

    fn deselect(&mut self) {
        let position = self
            .selected
            .as_ref()
            .and_then(|id| self.design.node(id))
            .map(|node| node.position);
        if let Some(position) = position {
            self.perform(Action::Click(position));
        }
    }

    fn change(&mut self, change: StateChange) {
        self.state = self.state.apply(change);
    }

    fn revalidate(&mut self) {
        self.validation = validate_design(&self.design, &self.level().vehicles);
    }

    /// Stresses and breakage left by a finished run only last until the next edit
    fn clear_run_marks(&mut self) {
        let marked = self
            .design
            .beams
            .iter()
            .any(|beam| beam.broken || beam.stress != 0.0);
        if marked {
            self.design.clear_stresses();
            self.rebuild_engine();
            self.revalidate();
        }
    }

    /// Throw away the engine contents and mirror the design from scratch
    fn rebuild_engine(&mut self) {
        self.engine.initialize(&self.design.nodes);
        for node in &self.design.nodes {
            self.engine.add_node(node);
        }
        for beam in self.design.beams.iter().filter(|beam| !beam.broken) {
            if let (Some(start), Some(end)) = (self.design.node(&beam.start), self.design.node(&beam.end)) {
                self.engine.add_beam(beam, start, end);
            }
        }
    }

    fn click(&mut self, point: Vec2) -> Vec<Notice> {
        match pick(&self.design, &self.config.grid, point, self.config.pick_radius) {
            Pick::Beam(id) if self.state.delete_mode => self.remove_beam(&id),
            Pick::Node(id) if !self.state.delete_mode => self.click_node(id),
            Pick::Empty(snapped) if !self.state.delete_mode => self.click_empty(snapped),
            _ => Vec::new(),
        }
    }

    fn click_node(&mut self, id: NodeId) -> Vec<Notice> {
        match self.selected.take() {
            None => {
                self.selected = Some(id.clone());
                vec![Notice::Selected(Some(id))]
            }
            Some(selected) if selected == id => vec![Notice::Selected(None)],
            Some(selected) => {
                let before = self.design.clone();
                let budget = self.state.budget;
                match self.connect(&selected, &id) {
                    Ok(notice) => {
                        self.history.push(&before, budget.remaining);
                        self.selected = Some(id);
                        self.revalidate();
                        vec![notice]
                    }
                    Err(error) => {
                        self.selected = Some(selected);
                        vec![Notice::Rejected(error)]
                    }
                }
            }
        }
    }

    fn click_empty(&mut self, position: Vec2) -> Vec<Notice> {
        let before = self.design.clone();
        let budget = self.state.budget;
        let placed = self.design.place_node(position);
        let mut notices = vec![Notice::NodePlaced(placed.clone())];
        if let Some(selected) = self.selected.clone() {
            match self.connect(&selected, &placed) {
                Ok(notice) => notices.push(notice),
                Err(error) => {
                    self.design = before;
                    return vec![Notice::Rejected(error)];
                }
            }
        }
        if let Some(node) = self.design.node(&placed) {
            self.engine.add_node(node);
        }
        self.history.push(&before, budget.remaining);
        self.selected = Some(placed);
        self.revalidate();
        notices
    }

    /// Build a beam with the selected material, paying unless in zen mode
    fn connect(&mut self, start: &NodeId, end: &NodeId) -> Result<Notice, BridgeError> {
        let zen = self.state.zen;
        let mut budget = self.state.budget;
        let id = self
            .design
            .create_beam(start, end, self.state.material, |cost| {
                if zen {
                    Ok(())
                } else {
                    budget.charge(cost)
                }
            })
            .inspect_err(|error| log::debug!("Beam rejected: {error}"))?;
        self.change(StateChange::SetBudget(budget));
        let beam = self.design.beam(&id).ok_or_else(|| BridgeError::BeamNotFound(id.clone()))?;
        if let (Some(start), Some(end)) = (self.design.node(start), self.design.node(end)) {
            self.engine.add_beam(beam, start, end);
        }
        Ok(Notice::BeamBuilt {
            id,
            cost: beam.cost,
        })
    }

    fn remove_beam(&mut self, id: &BeamId) -> Vec<Notice> {
        let before = self.design.clone();
        let budget = self.state.budget;
        match self.design.remove_beam(id) {
            Ok(beam) => {
                self.engine.remove_beam(&beam.id);
                let refund = if self.state.zen { 0 } else { beam.cost };
                let mut refunded = budget;
                refunded.refund(refund);
                self.change(StateChange::SetBudget(refunded));
                self.history.push(&before, budget.remaining);
                self.revalidate();
                vec![Notice::BeamRemoved {
                    id: beam.id,
                    refund,
                }]
            }
            Err(error) => {
                log::debug!("Ignoring removal: {error}");
                Vec::new()
            }
        }
    }

    fn start_test(&mut self) -> Vec<Notice> {
        if self.run.is_some() {
            return Vec::new();
        }
        self.revalidate();
        if !self.validation.is_valid {
            let reasons = self
                .validation
                .errors
                .iter()
                .map(|finding| finding.message.clone())
                .collect();
            return vec![Notice::TestBlocked(reasons)];
        }
        for warning in &self.validation.warnings {
            log::info!("Testing anyway: {}", warning.message);
        }
        self.design.clear_stresses();
        self.rebuild_engine();
        let level = self.level();
        for (from, to) in level.grounds() {
            self.engine.add_ground(from, to);
        }
        for vehicle in &level.vehicles {
            self.engine.add_vehicle(vehicle);
        }
        self.selected = None;
        self.outcome = None;
        self.change(StateChange::SetPaused(false));
        self.run = Some(SimulationRun::new(level));
        log::info!("Testing {} with {} beams", level.name, self.design.beams.len());
        vec![Notice::TestStarted]
    }

    fn stop_test(&mut self) -> Vec<Notice> {
        if self.run.take().is_none() {
            return Vec::new();
        }
        self.design.clear_stresses();
        self.rebuild_engine();
        self.revalidate();
        vec![Notice::TestStopped]
    }

    fn finish_run(&mut self) -> Notice {
        let Some(run) = self.run.take() else {
            return Notice::TestStopped;
        };
        let budget_used = self.design.total_cost();
        let points = score(
            &self.design.beams,
            budget_used,
            self.level().budget,
            run.crossed(),
        );
        let outcome = Outcome {
            vehicles_crossed: run.crossed(),
            vehicles_lost: run.lost(),
            broken_beams: run.broken.clone(),
            budget_used,
            score: points,
            passed: run.lost() == 0 && run.crossed() > 0,
            seconds: run.age().seconds(),
        };
        log::info!(
            "Run finished after {}: {} crossed, {} lost, score {}",
            run.age(),
            outcome.vehicles_crossed,
            outcome.vehicles_lost,
            outcome.score
        );
        self.change(StateChange::SetScore(points));
        if outcome.passed {
            self.change(StateChange::SetPassed(true));
        }
        self.outcome = Some(outcome.clone());
        Notice::RunFinished(outcome)
    }

    pub fn push_history(&mut self) {
        self.history.push(&self.design, self.state.budget.remaining);
    }

    fn undo(&mut self) -> Vec<Notice> {
        match self.history.undo(&self.design, self.state.budget.remaining) {
            None => vec![Notice::NothingToUndo],
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                Vec::new()
            }
        }
    }

    fn redo(&mut self) -> Vec<Notice> {
        match self.history.redo(&self.design, self.state.budget.remaining) {
            None => vec![Notice::NothingToRedo],
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                Vec::new()
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: DesignSnapshot) {
        log::debug!("Restoring snapshot {} ({})", snapshot.id, snapshot.label);
        self.design = snapshot.design;
        let budget = self.state.budget.restored(snapshot.budget_remaining);
        self.change(StateChange::SetBudget(budget));
        self.selected = None;
        self.rebuild_engine();
        self.revalidate();
    }

    pub fn save_design(&mut self, label: &str) -> usize {
        let id = self.saved.save(
            self.state.level,
            label,
            &self.design,
            self.state.budget.remaining,
        );
        log::debug!("Saved design {id} \"{label}\"");
        id
    }

    fn restore_design(&mut self, id: Option<usize>) -> Vec<Notice> {
        match self.saved.restore(self.state.level, id) {
            Err(error) => vec![Notice::Rejected(error)],
            Ok(snapshot) => {
                let id = snapshot.id;
                self.push_history();
                self.apply_snapshot(snapshot);
                vec![Notice::Restored(id)]
            }
        }
    }

    fn toggle_zen(&mut self) -> Vec<Notice> {
        self.change(StateChange::ToggleZen);
        if !self.state.zen {
            let budget = self.state.budget.after_spending(self.design.total_cost());
            self.change(StateChange::SetBudget(budget));
        }
        Vec::new()
    }

    fn reset_level(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if !self.design.beams.is_empty() {
            notices.push(Notice::Saved(self.save_design("before reset")));
        }
        notices.extend(self.load_level(self.state.level));
        notices
    }

    fn advance_level(&mut self) -> Vec<Notice> {
        if !self.state.level_passed && !self.state.zen {
            return vec![Notice::LevelLocked];
        }
        match self.state.level.next() {
            None => vec![Notice::LastLevel],
            Some(next) => self.load_level(next),
        }
    }

    fn load_level(&mut self, level: LevelName) -> Vec<Notice> {
        self.run = None;
        self.outcome = None;
        self.selected = None;
        self.highlight = None;
        self.change(StateChange::SetLevel(level));
        self.design = Design::new(level.level().nodes.clone());
        self.history.restart(level);
        self.rebuild_engine();
        self.revalidate();
        log::info!("Loaded level {level}");
        vec![Notice::LevelLoaded(level)]
    }
}
