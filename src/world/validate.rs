//! Playability check
//!
//! A level is playable when it has exactly one player, at least one box,
//! and as many goals as boxes. The check is pure and never fails on its own.

use thiserror::Error;

use super::{LayerKind, TileMap, TileRoles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Zero or more than one player marker on the Entities layer
    #[error("level needs exactly one player (found {found})")]
    MissingPlayer { found: usize },
    #[error("level needs at least one box")]
    NoBoxes,
    #[error("{boxes} boxes but {goals} goals")]
    BoxGoalMismatch { boxes: usize, goals: usize },
}

/// Check that a map can be played
pub fn validate(map: &TileMap, roles: &TileRoles) -> Result<(), ValidationError> {
    let players = map.count(LayerKind::Entities, roles.player);
    if players != 1 {
        return Err(ValidationError::MissingPlayer { found: players });
    }

    let boxes = map.count(LayerKind::Entities, roles.box_tile);
    if boxes == 0 {
        return Err(ValidationError::NoBoxes);
    }

    let goals = map.count_non_empty(LayerKind::Goals);
    if goals != boxes {
        return Err(ValidationError::BoxGoalMismatch { boxes, goals });
    }

    Ok(())
}
