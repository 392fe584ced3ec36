//! Error types for the shunting simulation
//!
//! Two classes exist: `DefinitionError` for malformed puzzle definitions
//! (fatal, abort loading) and `MoveFailure` for rejected moves (recoverable,
//! the caller's state is untouched).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::GridPoint;
use super::track::TrackState;

/// A malformed track layout, turntable, rolling stock entry or puzzle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("segment id must be non-empty")]
    EmptySegmentId,
    #[error("segment '{0}' must connect two different nodes")]
    DegenerateSegment(String),
    #[error("straight segment '{0}' must connect orthogonally adjacent nodes")]
    StraightNotAdjacent(String),
    #[error("curved segment '{0}' must connect diagonally adjacent nodes")]
    CurveNotDiagonal(String),
    #[error("duplicate segment id '{0}'")]
    DuplicateSegment(String),
    #[error("edge on segment '{0}' is a self-loop")]
    SelfLoopEdge(String),
    #[error("segment '{segment}' lies inside turntable '{turntable}'")]
    SegmentInsideTurntable { segment: String, turntable: String },
    #[error("switch at {state} has too many options ({count})")]
    TooManySwitchOptions { state: TrackState, count: usize },
    #[error("duplicate turntable id '{0}'")]
    DuplicateTurntable(String),
    #[error("turntable '{id}': {reason}")]
    InvalidTurntable { id: String, reason: String },
    #[error("rolling stock {id}: {reason}")]
    InvalidRollingStock { id: u32, reason: String },
    #[error("duplicate rolling stock id {0}")]
    DuplicateRollingStock(u32),
    #[error("placement must contain at least one edge")]
    EmptyPlacement,
    #[error("placement edges are not contiguous at {node} (edge {index})")]
    DiscontinuousPlacement { node: GridPoint, index: usize },
    #[error("goal refers to unknown segment '{0}'")]
    UnknownGoalSegment(String),
}

/// Why a move was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    Unknown,
    InvalidState,
    UnknownVehicle,
    NotAnEngine,
    InsufficientPower,
    NoTrackAhead,
    Collision,
    InvalidSwitch,
    InvalidCoupling,
    NonLinearTrain,
    LoopDetected,
    InvalidTurntable,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A rejected move: the error kind plus a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct MoveFailure {
    pub kind: MoveError,
    pub message: String,
}

impl MoveFailure {
    pub fn new(kind: MoveError, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(MoveError::InvalidState, message)
    }
}

/// Failure to load or store a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported {kind} schema version {version}")]
    UnsupportedSchemaVersion { kind: &'static str, version: u32 },
    #[error("{0}")]
    Definition(#[from] DefinitionError),
    #[error("curve segment '{0}' has no bias")]
    MissingCurveBias(String),
    #[error("invalid solution history: {0}")]
    InvalidHistory(String),
}

/// Undo or redo past either end of a solution history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}
