//! Beat row widget - the accent pattern with the live beat highlighted

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tactus::meter::BeatAccent;

use super::UiState;

/// Render the accent pattern row
pub fn render_beats(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Beats ").borders(Borders::ALL);

    let mut spans = vec![Span::raw(" ")];
    for (i, accent) in state.config.beat_pattern.iter().enumerate() {
        let symbol = match accent {
            BeatAccent::Strong => "◉",
            BeatAccent::Normal => "●",
            BeatAccent::Mute => "·",
        };
        let mut style = match accent {
            BeatAccent::Strong => Style::default().fg(Color::Cyan),
            BeatAccent::Normal => Style::default().fg(Color::White),
            BeatAccent::Mute => Style::default().fg(Color::DarkGray),
        };
        if state.playing && state.beat == i as i32 {
            style = Style::default().fg(Color::Black).bg(if state.silenced {
                Color::DarkGray
            } else {
                Color::Green
            });
        }
        let cell = if i == state.cursor {
            format!("[{}]", symbol)
        } else {
            format!(" {} ", symbol)
        };
        spans.push(Span::styled(cell, style));
    }

    spans.push(Span::styled(
        "   strong / normal / muted",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
