//! TUI widgets for tactus.

pub mod state;

mod beats;
mod practice;
mod transport;

pub use state::UiState;

pub use beats::render_beats;
pub use practice::render_practice;
pub use transport::render_transport;
