//! Practice panel widget - silent bars, tempo ramp, timer and presets

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tactus::config::RampMode;

use super::UiState;

fn toggle_span(enabled: bool) -> Span<'static> {
    if enabled {
        Span::styled("on ", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    }
}

/// Render the practice panel
pub fn render_practice(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Practice ").borders(Borders::ALL);

    let silent = &state.config.silent;
    let ramp = &state.config.tempo_ramp;

    let silent_line = Line::from(vec![
        Span::styled(" Silent bars ", Style::default().fg(Color::White)),
        toggle_span(silent.enabled),
        Span::styled(
            format!(
                "   {} sounded, {} silent per cycle",
                silent.sound_bars, silent.silent_bars
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let direction = match ramp.mode {
        RampMode::Up => "up",
        RampMode::Down => "down",
    };
    let ramp_line = Line::from(vec![
        Span::styled(" Tempo ramp  ", Style::default().fg(Color::White)),
        toggle_span(ramp.enabled),
        Span::styled(
            format!(
                "   {} to {} bpm, {} bpm every {} bars",
                direction, ramp.target_bpm, ramp.step_bpm, ramp.every_bars
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let timer_line = Line::from(vec![
        Span::styled(" Timer       ", Style::default().fg(Color::White)),
        Span::styled(
            state.timer_display.clone(),
            Style::default().fg(if state.timer_running {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            format!("   {}", state.timer_mode),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if state.timer_sync {
                "   stops playback when done"
            } else {
                ""
            },
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let preset_line = if state.presets.is_empty() {
        Line::from(Span::styled(
            " Presets     none saved",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::styled(
            " Presets     ",
            Style::default().fg(Color::White),
        )];
        for (i, name) in state.presets.iter().enumerate() {
            let style = if state.selected_preset == Some(i) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(format!("{} {}", (i + 1) % 10, name), style));
            spans.push(Span::raw("  "));
        }
        Line::from(spans)
    };

    let mut lines = vec![silent_line, ramp_line, timer_line, preset_line];
    if !state.status.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {}", state.status),
            Style::default().fg(Color::Magenta),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
