//! Transport bar widget - BPM, play state, position, sound and volume

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiState;

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" tactus ").borders(Borders::ALL);

    let play_symbol = if state.playing { "▶" } else { "⏸" };
    let play_label = if state.playing { "Playing" } else { "Stopped" };

    // Beat is -1 while stopped; show 1-based positions when running.
    let position = if state.playing && state.beat >= 0 {
        format!("Bar {} | Beat {}  ", state.measure + 1, state.beat + 1)
    } else {
        "Bar - | Beat -  ".to_string()
    };

    let mut spans = vec![
        Span::styled(
            format!(" BPM: {}  ", state.config.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_label),
            Style::default().fg(if state.playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{}  ", state.config.time_signature),
            Style::default().fg(Color::White),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!(
                "{} | vol {}%",
                state.config.sound.label(),
                state.config.volume
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if state.silenced {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("SILENT BAR", Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
