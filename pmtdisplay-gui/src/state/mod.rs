//! Application state modules.

mod notice;
mod ui;

pub use notice::{Notice, NoticeLevel};
pub use ui::{parse_event, parse_range, range_text, UiState};
