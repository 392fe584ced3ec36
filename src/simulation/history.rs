//! Versioned edit history of a solution

use super::error::HistoryError;
use super::verifier::Solution;

/// Snapshot history of solution versions with undo and redo
///
/// Version 0 is the starting solution. Versions after `current_version` can
/// be restored with `redo` until a new version is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionHistory {
    versions: Vec<Solution>,
    current: usize,
}

impl SolutionHistory {
    pub fn new(starting: Solution) -> Self {
        Self {
            versions: vec![starting],
            current: 0,
        }
    }

    /// Rebuilds a history from its versions; `None` if `versions` is empty or
    /// `current` is out of range
    pub fn from_versions(versions: Vec<Solution>, current: usize) -> Option<Self> {
        if current >= versions.len() {
            return None;
        }
        Some(Self { versions, current })
    }

    pub fn current_version(&self) -> usize {
        self.current
    }

    pub fn latest_version(&self) -> usize {
        self.versions.len() - 1
    }

    pub fn current_solution(&self) -> &Solution {
        &self.versions[self.current]
    }

    /// Every stored version, including redo-able ones
    pub fn all_versions(&self) -> &[Solution] {
        &self.versions
    }

    /// Appends a version after the current one, discarding any redo-able versions
    pub fn add(&mut self, version: Solution) {
        self.versions.truncate(self.current + 1);
        self.versions.push(version);
        self.current += 1;
    }

    pub fn undo(&mut self) -> Result<&Solution, HistoryError> {
        if self.current == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.current -= 1;
        Ok(self.current_solution())
    }

    pub fn redo(&mut self) -> Result<&Solution, HistoryError> {
        if self.current == self.latest_version() {
            return Err(HistoryError::NothingToRedo);
        }
        self.current += 1;
        Ok(self.current_solution())
    }

    /// Versions from the start through the current one
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.versions[..=self.current].iter()
    }
}
