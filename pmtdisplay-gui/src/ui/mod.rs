//! UI rendering modules.
//!
//! - `toolbar`: view buttons, navigation, range fields and actions
//! - `main_view`: central panel with the active display
//! - `colorbar`: right-hand colour scale
//! - `status_bar`: event counter and notices

mod colorbar;
mod main_view;
mod status_bar;
pub mod theme;
mod toolbar;
