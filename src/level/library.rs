/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use std::sync::OnceLock;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::bridge::{Node, NodeId, Vehicle};
use crate::level::{Level, River, Theme};

static LEVELS: OnceLock<Vec<Level>> = OnceLock::new();

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum LevelName {
    #[default]
    FirstCrossing,
    TwinSpans,
    WindyGorge,
    HighRoad,
    Convoy,
}

impl LevelName {
    pub fn level(self) -> &'static Level {
        &levels()[self.index()]
    }

    pub fn index(self) -> usize {
        LevelName::iter()
            .position(|name| name == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        LevelName::iter().nth(index)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

pub fn levels() -> &'static [Level] {
    LEVELS.get_or_init(|| LevelName::iter().map(build).collect())
}

fn anchor(id: &str, x: f32, y: f32) -> Node {
    Node::anchor(NodeId::from(id), Vec2::new(x, y))
}

fn support(id: &str, x: f32, y: f32) -> Node {
    Node::fixed(NodeId::from(id), Vec2::new(x, y))
}

fn car(id: &str, x: f32, speed: f32) -> Vehicle {
    Vehicle::new(id, Vec2::new(x, 5.0), 8.0, Vec2::new(speed, 0.0))
}

fn truck(id: &str, x: f32, speed: f32) -> Vehicle {
    Vehicle::new(id, Vec2::new(x, 5.0), 20.0, Vec2::new(speed, 0.0))
}

fn build(name: LevelName) -> Level {
    use LevelName::*;
    match name {
        FirstCrossing => Level {
            name,
            title: "First Crossing",
            description: "A narrow creek. Connect the two banks.",
            budget: 500,
            nodes: vec![anchor("left-bank", 0.0, 0.0), anchor("right-bank", 300.0, 0.0)],
            vehicles: vec![car("car", -100.0, 60.0)],
            wind: None,
            river: Some(River {
                width: 300.0,
                depth: 120.0,
            }),
            theme: Some(Theme::Day),
        },
        TwinSpans => Level {
            name,
            title: "Twin Spans",
            description: "A rock in the middle of the river is there to lean on.",
            budget: 900,
            nodes: vec![
                anchor("left-bank", 0.0, 0.0),
                support("rock", 200.0, -100.0),
                anchor("right-bank", 400.0, 0.0),
            ],
            vehicles: vec![car("car", -100.0, 60.0), car("van", -250.0, 60.0)],
            wind: None,
            river: Some(River {
                width: 400.0,
                depth: 160.0,
            }),
            theme: Some(Theme::Day),
        },
        WindyGorge => Level {
            name,
            title: "Windy Gorge",
            description: "Gusts sweep through the gorge. Brace against them.",
            budget: 1400,
            nodes: vec![
                anchor("left-cliff", 0.0, 0.0),
                support("left-ledge", 40.0, -120.0),
                support("right-ledge", 460.0, -120.0),
                anchor("right-cliff", 500.0, 0.0),
            ],
            vehicles: vec![truck("truck", -100.0, 50.0)],
            wind: Some(12.0),
            river: Some(River {
                width: 500.0,
                depth: 300.0,
            }),
            theme: Some(Theme::Dusk),
        },
        HighRoad => Level {
            name,
            title: "High Road",
            description: "The far bank is higher. Hang the deck from the towers.",
            budget: 1600,
            nodes: vec![
                anchor("low-bank", 0.0, 0.0),
                support("west-tower", 100.0, 160.0),
                support("east-tower", 300.0, 200.0),
                anchor("high-bank", 400.0, 60.0),
            ],
            vehicles: vec![car("car", -100.0, 70.0), truck("truck", -300.0, 50.0)],
            wind: Some(4.0),
            river: Some(River {
                width: 400.0,
                depth: 200.0,
            }),
            theme: Some(Theme::Day),
        },
        Convoy => Level {
            name,
            title: "Convoy",
            description: "Three vehicles, one bridge, no second chances.",
            budget: 2200,
            nodes: vec![
                anchor("west-bank", 0.0, 0.0),
                support("west-pier", 200.0, -120.0),
                support("east-pier", 400.0, -120.0),
                anchor("east-bank", 600.0, 0.0),
            ],
            vehicles: vec![
                truck("lead", -100.0, 50.0),
                car("middle", -220.0, 50.0),
                truck("tail", -340.0, 50.0),
            ],
            wind: None,
            river: Some(River {
                width: 600.0,
                depth: 200.0,
            }),
            theme: Some(Theme::Night),
        },
    }
}
