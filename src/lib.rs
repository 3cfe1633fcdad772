pub mod audio;
pub mod click;
pub mod config;
pub mod engine; // Look-ahead beat scheduling
pub mod meter; // Time signatures and accent patterns
pub mod preset;
pub mod timer;
