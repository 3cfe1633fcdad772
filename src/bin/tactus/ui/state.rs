//! Snapshot handed to the widgets each draw.

use tactus::config::MetronomeConfig;

/// Everything the widgets need for one frame.
pub struct UiState {
    pub config: MetronomeConfig,
    pub playing: bool,
    /// Beat within the measure, -1 while stopped.
    pub beat: i32,
    pub measure: u64,
    pub silenced: bool,
    /// Accent-pattern edit position.
    pub cursor: usize,
    pub timer_display: String,
    pub timer_mode: String,
    pub timer_running: bool,
    pub timer_sync: bool,
    /// Preset display names, in store order.
    pub presets: Vec<String>,
    pub selected_preset: Option<usize>,
    /// Transient message from the last action.
    pub status: String,
}
