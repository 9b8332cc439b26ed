/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::error::BridgeError;
use crate::bridge::Design;
use crate::level::library::LevelName;

pub const HISTORY_CAPACITY: usize = 50;
pub const SAVED_DESIGNS_CAPACITY: usize = 5;

/// A value copy of the design and the budget left at the time, without
/// any stress or breakage from a test run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignSnapshot {
    pub id: usize,
    pub level: LevelName,
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub design: Design,
    pub budget_remaining: u32,
}

impl DesignSnapshot {
    pub fn capture(
        id: usize,
        level: LevelName,
        label: &str,
        design: &Design,
        budget_remaining: u32,
    ) -> Self {
        let mut design = design.clone();
        design.clear_stresses();
        Self {
            id,
            level,
            label: label.to_string(),
            timestamp: Utc::now(),
            design,
            budget_remaining,
        }
    }
}

/// Linear undo/redo over one level. Pushing after an undo discards the redo branch.
#[derive(Clone, Debug)]
pub struct History {
    level: LevelName,
    undo: VecDeque<DesignSnapshot>,
    redo: Vec<DesignSnapshot>,
    capacity: usize,
    captured: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(LevelName::default(), HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(level: LevelName, capacity: usize) -> Self {
        Self {
            level,
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            captured: 0,
        }
    }

    pub fn push(&mut self, design: &Design, budget_remaining: u32) {
        let snapshot = self.capture("edit", design, budget_remaining);
        self.push_undo(snapshot);
        self.redo.clear();
    }

    /// Swap the current state for the most recent undo entry
    pub fn undo(&mut self, design: &Design, budget_remaining: u32) -> Option<DesignSnapshot> {
        let previous = self.undo.pop_back()?;
        let current = self.capture("redo", design, budget_remaining);
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, design: &Design, budget_remaining: u32) -> Option<DesignSnapshot> {
        let next = self.redo.pop()?;
        let current = self.capture("undo", design, budget_remaining);
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Forget everything and record edits for another level from now on
    pub fn restart(&mut self, level: LevelName) {
        self.level = level;
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, snapshot: DesignSnapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    fn capture(&mut self, label: &str, design: &Design, budget_remaining: u32) -> DesignSnapshot {
        self.captured += 1;
        DesignSnapshot::capture(self.captured, self.level, label, design, budget_remaining)
    }
}

/// The most recent explicitly saved designs, oldest evicted first
#[derive(Clone, Debug)]
pub struct SavedDesigns {
    entries: VecDeque<DesignSnapshot>,
    capacity: usize,
    next_id: usize,
}

impl Default for SavedDesigns {
    fn default() -> Self {
        Self::new(SAVED_DESIGNS_CAPACITY)
    }
}

impl SavedDesigns {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn save(
        &mut self,
        level: LevelName,
        label: &str,
        design: &Design,
        budget_remaining: u32,
    ) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(DesignSnapshot::capture(
            id,
            level,
            label,
            design,
            budget_remaining,
        ));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        id
    }

    /// A copy of the chosen snapshot, or the newest one saved on `level` when
    /// no id is given. Snapshots of other levels are refused.
    pub fn restore(&self, level: LevelName, id: Option<usize>) -> Result<DesignSnapshot, BridgeError> {
        let found = match id {
            Some(id) => self.entries.iter().find(|snapshot| snapshot.id == id),
            None => self.entries.iter().rev().find(|snapshot| snapshot.level == level),
        };
        match found {
            None => Err(BridgeError::NothingToRestore),
            Some(snapshot) if snapshot.level != level => Err(BridgeError::OtherLevel {
                saved: snapshot.level,
                current: level,
            }),
            Some(snapshot) => Ok(snapshot.clone()),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &DesignSnapshot> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::material::Material;
    use crate::bridge::Node;
    use glam::Vec2;

    fn design() -> Design {
        Design::new(vec![
            Node::anchor("left".into(), Vec2::ZERO),
            Node::anchor("right".into(), Vec2::new(200.0, 0.0)),
        ])
    }

    fn edit(design: &mut Design, x: f32) {
        let id = design.place_node(Vec2::new(x, 10.0));
        design
            .create_beam(&"left".into(), &id, Material::Wood, |_| Ok(()))
            .unwrap();
    }

    #[test]
    fn test_undo_k_times_then_redo() {
        let mut history = History::default();
        let mut live = design();
        let mut states = Vec::new();
        for step in 0..4 {
            states.push(live.clone());
            history.push(&live, 100 - step);
            edit(&mut live, 20.0 * (step + 1) as f32);
        }
        let before_undo = live.clone();
        for k in 1..=3 {
            let snapshot = history.undo(&live, 0).unwrap();
            live = snapshot.design;
            assert_eq!(live, states[4 - k]);
        }
        let snapshot = history.redo(&live, 0).unwrap();
        assert_eq!(snapshot.design, states[2]);
        live = snapshot.design;
        let snapshot = history.undo(&live, 0).unwrap();
        assert_eq!(snapshot.design, states[1]);
        assert_ne!(before_undo, states[1]);
    }

    #[test]
    fn test_empty_stacks_are_no_ops() {
        let mut history = History::default();
        assert!(history.undo(&design(), 0).is_none());
        assert!(history.redo(&design(), 0).is_none());
        assert!(!history.can_undo() && !history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::default();
        let mut live = design();
        history.push(&live, 10);
        edit(&mut live, 50.0);
        live = history.undo(&live, 5).unwrap().design;
        assert!(history.can_redo());
        history.push(&live, 10);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(LevelName::FirstCrossing, 3);
        let live = design();
        for budget in 0..10 {
            history.push(&live, budget);
        }
        assert_eq!(history.undo_depth(), 3);
        let oldest_kept = (0..3)
            .filter_map(|_| history.undo(&live, 0))
            .last()
            .unwrap();
        assert_eq!(oldest_kept.budget_remaining, 7);
    }

    const HERE: LevelName = LevelName::FirstCrossing;

    #[test]
    fn test_saved_ring_buffer() {
        let mut saved = SavedDesigns::new(2);
        assert_eq!(saved.restore(HERE, None), Err(BridgeError::NothingToRestore));
        let live = design();
        let first = saved.save(HERE, "one", &live, 1);
        let second = saved.save(HERE, "two", &live, 2);
        let third = saved.save(HERE, "three", &live, 3);
        assert_eq!(saved.len(), 2);
        assert!(saved.restore(HERE, Some(first)).is_err());
        assert_eq!(saved.restore(HERE, Some(second)).unwrap().label, "two");
        assert_eq!(saved.restore(HERE, None).unwrap().id, third);
    }

    #[test]
    fn test_restore_stays_on_its_level() {
        let mut saved = SavedDesigns::default();
        let live = design();
        let mine = saved.save(HERE, "mine", &live, 1);
        let theirs = saved.save(LevelName::TwinSpans, "theirs", &live, 2);
        assert_eq!(saved.restore(HERE, None).unwrap().id, mine);
        assert_eq!(
            saved.restore(HERE, Some(theirs)),
            Err(BridgeError::OtherLevel {
                saved: LevelName::TwinSpans,
                current: HERE
            })
        );
        assert_eq!(
            saved.restore(LevelName::Convoy, None),
            Err(BridgeError::NothingToRestore)
        );
    }

    #[test]
    fn test_snapshot_drops_test_run_marks() {
        let mut live = design();
        edit(&mut live, 100.0);
        live.beams[0].stress = 2_500.0;
        live.beams[0].broken = true;
        let snapshot = DesignSnapshot::capture(0, HERE, "after run", &live, 10);
        assert_eq!(snapshot.design.beams[0].stress, 0.0);
        assert!(!snapshot.design.beams[0].broken);
        assert!(live.beams[0].broken);
    }

    #[test]
    fn test_snapshot_is_detached_from_live_design() {
        let mut saved = SavedDesigns::default();
        let mut live = design();
        edit(&mut live, 100.0);
        saved.save(HERE, "before", &live, 50);
        live.beams[0].stress = 77.0;
        live.nodes[2].position = Vec2::new(-1.0, -1.0);
        let restored = saved.restore(HERE, None).unwrap();
        assert_eq!(restored.design.beams[0].stress, 0.0);
        assert_eq!(restored.design.nodes[2].position, Vec2::new(100.0, 10.0));
    }
}
