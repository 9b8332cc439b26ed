/// Integration tests driving a whole game through player actions
use std::collections::HashMap;

use glam::Vec2;

use bridge_lab::bridge::error::BridgeError;
use bridge_lab::bridge::material::Material;
use bridge_lab::bridge::validation::FindingKind;
use bridge_lab::bridge::{Beam, BeamId, Node, NodeId, Vehicle};
use bridge_lab::game::{Game, GameConfig};
use bridge_lab::level::library::LevelName;
use bridge_lab::physics::{Physics, PhysicsEngine};
use bridge_lab::{Action, Notice};

/// Vehicles slide right at a fixed pace, beams report scripted stress
#[derive(Default)]
struct ScriptedEngine {
    stresses: HashMap<BeamId, f32>,
    beams: Vec<BeamId>,
    removed: Vec<BeamId>,
    vehicles: Vec<(String, Vec2)>,
}

impl PhysicsEngine for ScriptedEngine {
    fn initialize(&mut self, _nodes: &[Node]) {
        self.reset();
    }

    fn add_node(&mut self, _node: &Node) {}

    fn add_beam(&mut self, beam: &Beam, _start: &Node, _end: &Node) {
        self.beams.push(beam.id.clone());
    }

    fn remove_beam(&mut self, id: &BeamId) {
        self.beams.retain(|beam| beam != id);
        self.removed.push(id.clone());
    }

    fn add_vehicle(&mut self, vehicle: &Vehicle) {
        self.vehicles.push((vehicle.id.clone(), vehicle.position));
    }

    fn add_ground(&mut self, _from: Vec2, _to: Vec2) {}

    fn calculate_stress(&self, id: &BeamId) -> f32 {
        if !self.beams.contains(id) {
            return 0.0;
        }
        self.stresses.get(id).copied().unwrap_or(2_000.0)
    }

    fn step(&mut self, _physics: &Physics) {
        for (_, position) in &mut self.vehicles {
            position.x += 100.0;
        }
    }

    fn node_position(&self, _id: &NodeId) -> Option<Vec2> {
        None
    }

    fn vehicle_positions(&self) -> Vec<(String, Vec2)> {
        self.vehicles.clone()
    }

    fn reset(&mut self) {
        self.beams.clear();
        self.vehicles.clear();
    }
}

fn build_span(game: &mut Game<impl PhysicsEngine>) {
    for x in [0.0, 100.0, 200.0, 300.0] {
        game.perform(Action::Click(Vec2::new(x, 0.0)));
    }
}

#[test]
fn test_budget_is_conserved_through_edits() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    game.perform(Action::SelectMaterial(Material::Steel));
    build_span(&mut game);
    game.perform(Action::SelectMaterial(Material::Cable));
    assert_eq!(
        game.perform(Action::Click(Vec2::new(300.0, 0.0))),
        vec![Notice::Selected(None)]
    );
    game.perform(Action::Click(Vec2::new(100.0, 0.0)));
    game.perform(Action::Click(Vec2::new(200.0, 100.0)));
    game.perform(Action::Click(Vec2::new(200.0, 0.0)));
    let state = game.state();
    assert_eq!(
        state.budget.remaining + game.design().total_cost(),
        state.budget.ceiling
    );

    game.perform(Action::ToggleDeleteMode);
    game.perform(Action::Click(Vec2::new(150.0, 50.0)));
    game.perform(Action::Click(Vec2::new(50.0, 0.0)));
    let state = game.state();
    assert_eq!(game.design().beams.len(), 3);
    assert_eq!(
        state.budget.remaining + game.design().total_cost(),
        state.budget.ceiling
    );
}

#[test]
fn test_undo_walks_back_every_edit() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    let mut designs = vec![game.design().clone()];
    for x in [0.0, 100.0, 200.0, 300.0] {
        game.perform(Action::Click(Vec2::new(x, 0.0)));
        if designs.last() != Some(game.design()) {
            designs.push(game.design().clone());
        }
    }
    assert_eq!(designs.len(), 4);
    for expected in designs.iter().rev().skip(1) {
        game.perform(Action::Undo);
        assert_eq!(game.design(), expected);
    }
    assert_eq!(game.perform(Action::Undo), vec![Notice::NothingToUndo]);
    assert_eq!(game.state().budget.remaining, 500);
}

#[test]
fn test_saved_designs_keep_the_newest_five() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    game.perform(Action::Click(Vec2::ZERO));
    for step in 1..=7 {
        game.perform(Action::Click(Vec2::new(step as f32 * 20.0, 0.0)));
        game.perform(Action::SaveDesign(format!("step {step}")));
    }
    assert_eq!(game.saved_designs().len(), 5);
    assert!(matches!(
        game.perform(Action::RestoreDesign(Some(0)))[0],
        Notice::Rejected(_)
    ));
    assert_eq!(game.perform(Action::RestoreDesign(Some(2))), vec![Notice::Restored(2)]);
    assert_eq!(game.design().beams.len(), 3);
    assert_eq!(game.state().budget.remaining, 494);
    game.perform(Action::Undo);
    assert_eq!(game.design().beams.len(), 7);
}

#[test]
fn test_run_breaks_beams_and_scores() {
    let mut engine = ScriptedEngine::default();
    engine.stresses.insert(BeamId::from("beam-3"), 1_000_000.0);
    let mut game = Game::with_engine(LevelName::FirstCrossing, GameConfig::default(), engine);
    build_span(&mut game);
    assert_eq!(game.perform(Action::Test), vec![Notice::TestStarted]);

    let mut notices = Vec::new();
    for _ in 0..10 {
        notices.extend(game.frame());
    }
    assert_eq!(notices[0], Notice::BeamBroke(BeamId::from("beam-3")));
    let Some(Notice::RunFinished(outcome)) = notices.last() else {
        panic!("run did not finish: {notices:?}");
    };
    assert!(outcome.passed);
    assert_eq!(outcome.vehicles_crossed, 1);
    assert_eq!(outcome.broken_beams, vec![BeamId::from("beam-3")]);
    assert_eq!(outcome.score, 358);
    assert!(!game.is_testing());
    assert_eq!(game.engine().removed, vec![BeamId::from("beam-3")]);
    assert_eq!(game.state().score, 358);

    assert_eq!(
        game.perform(Action::AdvanceLevel),
        vec![Notice::LevelLoaded(LevelName::TwinSpans)]
    );
    assert_eq!(game.state().budget.remaining, 900);
}

#[test]
fn test_real_physics_sags_the_deck() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    game.perform(Action::SelectMaterial(Material::Road));
    build_span(&mut game);
    game.perform(Action::Test);
    let middle = game.design().nodes[2].id.clone();
    let mut lowest = f32::MAX;
    for _ in 0..60 {
        game.frame();
        lowest = lowest.min(game.node_position(&middle).unwrap().y);
    }
    assert!(lowest < -1.0);
    assert!(game.validation().is_valid);
}

fn finished_run() -> Game<ScriptedEngine> {
    let mut engine = ScriptedEngine::default();
    engine.stresses.insert(BeamId::from("beam-3"), 1_000_000.0);
    let mut game = Game::with_engine(LevelName::FirstCrossing, GameConfig::default(), engine);
    build_span(&mut game);
    game.perform(Action::Test);
    while game.is_testing() {
        game.frame();
    }
    game
}

#[test]
fn test_first_edit_after_a_run_repairs_the_bridge() {
    let mut game = finished_run();
    assert!(game.design().beams.iter().any(|beam| beam.broken));
    assert!(game.validation().has(FindingKind::Overstressed));

    game.perform(Action::SaveDesign("after the run".into()));
    let saved = game.saved_designs().entries().next().unwrap();
    assert!(saved.design.beams.iter().all(|beam| !beam.broken && beam.stress == 0.0));

    let notices = game.perform(Action::Click(Vec2::new(150.0, -200.0)));
    assert!(matches!(notices[0], Notice::NodePlaced(_)));
    assert!(game.design().beams.iter().all(|beam| !beam.broken && beam.stress == 0.0));
    assert!(!game.validation().has(FindingKind::Overstressed));
    assert!(game.engine().beams.contains(&BeamId::from("beam-3")));

    game.perform(Action::Undo);
    assert!(game.design().beams.iter().all(|beam| !beam.broken));
    assert_eq!(game.engine().beams.len(), 3);
}

#[test]
fn test_saved_designs_stay_with_their_level() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    build_span(&mut game);
    assert_eq!(game.perform(Action::SaveDesign("span".into())), vec![Notice::Saved(0)]);
    game.perform(Action::ToggleZen);
    game.perform(Action::AdvanceLevel);
    game.perform(Action::ToggleZen);
    let initial = LevelName::TwinSpans.level().nodes.clone();

    assert_eq!(
        game.perform(Action::RestoreDesign(None)),
        vec![Notice::Rejected(BridgeError::NothingToRestore)]
    );
    assert_eq!(
        game.perform(Action::RestoreDesign(Some(0))),
        vec![Notice::Rejected(BridgeError::OtherLevel {
            saved: LevelName::FirstCrossing,
            current: LevelName::TwinSpans,
        })]
    );
    assert_eq!(game.design().nodes, initial);
    assert!(game.design().node(&NodeId::from("rock")).is_some());
    assert_eq!(game.state().budget.remaining, 900);
}

#[test]
fn test_demo_truss_carries_the_car() {
    let mut game = Game::new(LevelName::FirstCrossing, GameConfig::default());
    assert_eq!(game.build_demo_truss(Material::Road), Some(()));
    assert_eq!(game.design().beams.len(), 11);
    assert!(game.selected().is_none());
    assert_eq!(
        game.state().budget.remaining + game.design().total_cost(),
        500
    );
    assert_eq!(game.perform(Action::Test), vec![Notice::TestStarted]);
    let mut outcome = None;
    for _ in 0..1800 {
        for notice in game.frame() {
            if let Notice::RunFinished(finished) = notice {
                outcome = Some(finished);
            }
        }
        if !game.is_testing() {
            break;
        }
    }
    let outcome = outcome.expect("the car never finished");
    assert!(outcome.passed, "{outcome:?}");
    assert_eq!(outcome.vehicles_lost, 0);
}
