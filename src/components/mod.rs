mod player_controls;
pub mod queue_panel;
mod timer_card;
pub mod timer_form;
pub mod timer_grid;
pub mod url_prompt;
pub mod utils;

pub use player_controls::PlayerControlsComponent;
pub use queue_panel::QueuePanelComponent;
pub use timer_card::TimerCard;
pub use timer_form::TimerFormComponent;
pub use timer_grid::TimerGridComponent;
pub use url_prompt::UrlPromptComponent;

pub use ratatui::widgets::Widget;
pub use ratatui::widgets::WidgetRef;

use color_eyre::Result;

use crate::event::{EventState, Key};

/// What components ask of the app. Components never reach into each other;
/// they send one of these and the app routes it.
pub enum ComponentCommand {
    TimerGrid(timer_grid::Command),
    QueuePanel(queue_panel::Command),
    UrlPrompt(url_prompt::Command),
    TimerForm(timer_form::Command),
}

pub trait Component {
    fn event(&mut self, key: Key) -> Result<EventState>;
}
