use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

const DEFAULT_SELECT_LIMIT: i64 = 30;
const MAX_SELECT_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectLimit(i64);

impl SelectLimit {
    /// Out of range values are clamped to `1..=100`.
    pub fn new(value: impl Into<i64>) -> Self {
        SelectLimit(value.into().clamp(1, MAX_SELECT_LIMIT))
    }
}

impl Default for SelectLimit {
    fn default() -> Self {
        Self::new(DEFAULT_SELECT_LIMIT)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectOffset(i64);

impl SelectOffset {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectOffset(value.into().max(0))
    }
}
