use serde::{Deserialize, Serialize};

use super::Timer;

pub const LAYOUT_VERSION: u32 = 1;

/// Grid geometry persisted with the timers. `columns == 0` fits as many
/// cards as the terminal width allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridGeometry {
    #[serde(default)]
    pub columns: u16,
}

/// Everything written to `layout.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub version: u32,
    pub timers: Vec<Timer>,
    pub grid: GridGeometry,
}

impl Default for LayoutState {
    fn default() -> Self {
        LayoutState {
            version: LAYOUT_VERSION,
            timers: Vec::new(),
            grid: GridGeometry::default(),
        }
    }
}
