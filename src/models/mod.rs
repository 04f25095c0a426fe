mod layout;
mod timer;
mod track;

pub use layout::{GridGeometry, LAYOUT_VERSION, LayoutState};
pub use timer::{MAX_TOTAL_SECONDS, Timer, TimerMode, TimerState, new_timer_id};
pub use track::Track;
