//! Dimension generation and navigation.
//!
//! A dimension is a straight line of rooms: a safe entrance, a random run of
//! treasure/combat/special rooms, and a boss throne room at the end.

use crate::dice::{self, RandomSource};
use crate::world::{Dimension, Room, RoomType};
use std::collections::BTreeSet;
use thiserror::Error;

pub const MIN_ROOMS: usize = 5;
pub const MAX_ROOMS: usize = 12;
pub const MAX_STABILITY: u32 = 100;

/// Stability lost per sequential explore step.
pub const STABILITY_DECAY: u32 = 5;

/// Name of the first dimension a new character enters.
pub const STARTING_DIMENSION: &str = "Shadow Dimension Alpha-7";

/// Naming data for one room type.
#[derive(Debug, Clone, Copy)]
pub struct RoomTemplate {
    pub name: &'static str,
    pub icon: &'static str,
    pub room_type: RoomType,
}

const ENTRANCE: RoomTemplate = RoomTemplate {
    name: "Entrance Hall",
    icon: "🚪",
    room_type: RoomType::Safe,
};

const THRONE: RoomTemplate = RoomTemplate {
    name: "Guardian Throne Room",
    icon: "👑",
    room_type: RoomType::Boss,
};

/// Interior rooms, drawn with equal weight.
pub const INTERIOR_ROOMS: [RoomTemplate; 3] = [
    RoomTemplate {
        name: "Crystal Chamber",
        icon: "💎",
        room_type: RoomType::Treasure,
    },
    RoomTemplate {
        name: "Shadow Labyrinth",
        icon: "🌫️",
        room_type: RoomType::Combat,
    },
    RoomTemplate {
        name: "Aether Pool",
        icon: "🌀",
        room_type: RoomType::Special,
    },
];

/// Name templates for a dimension shift. `{}` is the new level.
const SHIFT_NAMES: [&str; 4] = [
    "Crystal Dimension Beta-{}",
    "Shadow Dimension Gamma-{}",
    "Aether Dimension Delta-{}",
    "Void Dimension Omega-{}",
];

impl RoomTemplate {
    fn build(&self, id: usize) -> Room {
        Room {
            id,
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            room_type: self.room_type,
        }
    }
}

/// Why a direct room move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("You are already in this room")]
    SameRoom,

    #[error("You can only move to adjacent rooms!")]
    NotAdjacent { from: usize, to: usize },

    #[error("There is no room {0} in this dimension")]
    NoSuchRoom(usize),
}

/// `min(5 + level / 2, 12)`.
pub fn room_count(level: u32) -> usize {
    (MIN_ROOMS + (level / 2) as usize).min(MAX_ROOMS)
}

/// Generate a fresh dimension at full stability, standing in the entrance.
pub fn generate_dimension(
    name: impl Into<String>,
    level: u32,
    rng: &mut dyn RandomSource,
) -> Dimension {
    let count = room_count(level);
    let rooms = (0..count)
        .map(|id| {
            if id == 0 {
                ENTRANCE.build(id)
            } else if id == count - 1 {
                THRONE.build(id)
            } else {
                INTERIOR_ROOMS[rng.pick_index(INTERIOR_ROOMS.len())].build(id)
            }
        })
        .collect();

    Dimension {
        name: name.into(),
        level,
        stability: MAX_STABILITY,
        rooms,
        current_room: 0,
        explored: BTreeSet::from([0]),
    }
}

/// Pick a name for the dimension reached by shifting to `level`.
pub fn shift_name(level: u32, rng: &mut dyn RandomSource) -> String {
    let template = dice::pick(rng, &SHIFT_NAMES).copied().unwrap_or(SHIFT_NAMES[0]);
    template.replace("{}", &level.to_string())
}

/// Generate the dimension one level deeper than `current`.
pub fn shift(current: &Dimension, rng: &mut dyn RandomSource) -> Dimension {
    let level = current.level.saturating_add(1);
    let name = shift_name(level, rng);
    generate_dimension(name, level, rng)
}

/// Step forward one room.
///
/// Returns the room entered, or `None` when already standing in the last
/// room, in which case nothing changes.
pub fn explore(dimension: &mut Dimension) -> Option<Room> {
    if dimension.at_last_room() {
        return None;
    }

    dimension.current_room += 1;
    dimension.explored.insert(dimension.current_room);
    dimension.stability = dimension.stability.saturating_sub(STABILITY_DECAY);
    dimension.current().cloned()
}

/// Move directly to an adjacent room. Stability is not affected.
pub fn enter_room(dimension: &mut Dimension, room_id: usize) -> Result<Room, NavigationError> {
    if room_id == dimension.current_room {
        return Err(NavigationError::SameRoom);
    }
    if room_id.abs_diff(dimension.current_room) > 1 {
        return Err(NavigationError::NotAdjacent {
            from: dimension.current_room,
            to: room_id,
        });
    }
    let room = dimension
        .room(room_id)
        .cloned()
        .ok_or(NavigationError::NoSuchRoom(room_id))?;

    dimension.current_room = room_id;
    dimension.explored.insert(room_id);
    Ok(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::SeededRandom;
    use crate::testing::ScriptedRandom;

    #[test]
    fn test_room_layout_for_all_levels() {
        let mut rng = SeededRandom::new(7);
        for level in 0..40 {
            let dimension = generate_dimension("Test", level, &mut rng);
            let expected = (5 + (level / 2) as usize).clamp(5, 12);

            assert_eq!(dimension.rooms.len(), expected);
            assert_eq!(dimension.rooms[0].room_type, RoomType::Safe);
            assert_eq!(dimension.rooms[expected - 1].room_type, RoomType::Boss);
            for (id, room) in dimension.rooms.iter().enumerate() {
                assert_eq!(room.id, id);
                if id != 0 && id != expected - 1 {
                    assert!(matches!(
                        room.room_type,
                        RoomType::Treasure | RoomType::Combat | RoomType::Special
                    ));
                }
            }
        }
    }

    #[test]
    fn test_interior_draws_are_uniform_over_three() {
        let mut rng = ScriptedRandom::new(vec![0.1, 0.5, 0.9]);
        let dimension = generate_dimension("Test", 1, &mut rng);
        let types: Vec<_> = dimension.rooms.iter().map(|r| r.room_type).collect();

        assert_eq!(
            types,
            vec![
                RoomType::Safe,
                RoomType::Treasure,
                RoomType::Combat,
                RoomType::Special,
                RoomType::Boss
            ]
        );
    }

    #[test]
    fn test_explore_until_exhausted() {
        let mut rng = SeededRandom::new(3);
        let mut dimension = generate_dimension("Test", 1, &mut rng);

        for step in 1..5 {
            let room = explore(&mut dimension).unwrap();
            assert_eq!(room.id, step);
            assert_eq!(dimension.stability, 100 - 5 * step as u32);
        }
        assert_eq!(dimension.current().unwrap().room_type, RoomType::Boss);

        let before = dimension.clone();
        assert!(explore(&mut dimension).is_none());
        assert_eq!(dimension, before);
    }

    #[test]
    fn test_stability_floors_at_zero() {
        let mut rng = SeededRandom::new(3);
        let mut dimension = generate_dimension("Test", 30, &mut rng);
        dimension.stability = 7;

        explore(&mut dimension);
        assert_eq!(dimension.stability, 2);
        explore(&mut dimension);
        assert_eq!(dimension.stability, 0);
    }

    #[test]
    fn test_enter_room_rules() {
        let mut rng = SeededRandom::new(11);
        let mut dimension = generate_dimension("Test", 4, &mut rng);

        assert_eq!(enter_room(&mut dimension, 0), Err(NavigationError::SameRoom));
        assert_eq!(
            enter_room(&mut dimension, 2),
            Err(NavigationError::NotAdjacent { from: 0, to: 2 })
        );

        let room = enter_room(&mut dimension, 1).unwrap();
        assert_eq!(room.id, 1);
        assert_eq!(dimension.current_room, 1);
        assert!(dimension.is_explored(1));
        assert_eq!(dimension.stability, 100);

        enter_room(&mut dimension, 0).unwrap();
        assert_eq!(dimension.explored.len(), 2);
    }

    #[test]
    fn test_enter_room_past_the_end() {
        let mut rng = SeededRandom::new(11);
        let mut dimension = generate_dimension("Test", 1, &mut rng);
        dimension.current_room = 4;

        assert_eq!(enter_room(&mut dimension, 5), Err(NavigationError::NoSuchRoom(5)));
    }

    #[test]
    fn test_shift_goes_one_level_deeper() {
        let mut rng = ScriptedRandom::new(vec![0.8]);
        let current = generate_dimension(STARTING_DIMENSION, 1, &mut SeededRandom::new(1));
        let next = shift(&current, &mut rng);

        assert_eq!(next.level, 2);
        assert_eq!(next.name, "Void Dimension Omega-2");
        assert_eq!(next.rooms.len(), 6);
        assert_eq!(next.stability, MAX_STABILITY);
    }
}
