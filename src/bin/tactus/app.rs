//! Application state and event loop.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use tactus::audio::{AudioEngine, EngineHandle};
use tactus::config::{SilentUpdate, TempoRampUpdate};
use tactus::engine::Metronome;
use tactus::preset::PresetStore;
use tactus::timer::{PracticeTimer, TimerMode};

use crate::ui::{render_beats, render_practice, render_transport, UiState};

const HELP: &str = " [Space] Play  [↑/↓] BPM  [T] Meter  [←/→ Enter] Accents  [C] Sound  \
[[ ]] Volume  [N] Silent  [R] Ramp  [P] Timer  [S] Save  [1-9] Load  [Q] Quit";

/// Interactive application state
pub struct App {
    metronome: Metronome,
    handle: Arc<EngineHandle>,
    /// Keeps the output stream alive for the life of the app.
    _engine: AudioEngine,
    presets: PresetStore,
    timer: PracticeTimer,
    /// Stop playback when the countdown runs out.
    timer_sync: bool,
    /// Accent-pattern edit position.
    cursor: usize,
    selected_preset: Option<usize>,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(metronome: Metronome, engine: AudioEngine, presets: PresetStore) -> Self {
        let handle = engine.handle();
        let config = metronome.config();
        handle.set_volume(config.volume);
        handle.set_sound(config.sound);

        Self {
            metronome,
            handle,
            _engine: engine,
            presets,
            timer: PracticeTimer::new(),
            timer_sync: true,
            cursor: 0,
            selected_preset: None,
            status: String::new(),
            should_quit: false,
        }
    }

    /// Run the event loop until quit
    pub fn run(mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if self.timer.tick() && self.timer_sync {
                self.metronome.stop();
                self.status = String::from("Practice time is up");
            }

            terminal.draw(|frame| self.render(frame))?;

            // Keyboard input, non-blocking at ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if let Err(err) = self.metronome.toggle_play() {
                    self.status = err.to_string();
                }
            }
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_bpm(1),
            KeyCode::Down | KeyCode::Char('-') => self.adjust_bpm(-1),
            KeyCode::PageUp => self.adjust_bpm(10),
            KeyCode::PageDown => self.adjust_bpm(-10),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                let next = self.metronome.config().time_signature.next();
                self.metronome.set_time_signature(next);
                self.clamp_cursor();
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                let len = self.metronome.config().beat_pattern.len();
                self.cursor = (self.cursor + 1).min(len.saturating_sub(1));
            }
            KeyCode::Enter | KeyCode::Char('a') | KeyCode::Char('A') => {
                if self.cursor < self.metronome.config().beat_pattern.len() {
                    self.metronome.toggle_beat_accent(self.cursor);
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                let next = self.metronome.config().sound.next();
                self.metronome.set_sound(next);
                self.handle.set_sound(next);
            }
            KeyCode::Char('[') => self.adjust_volume(-10),
            KeyCode::Char(']') => self.adjust_volume(10),
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let enabled = self.metronome.config().silent.enabled;
                self.metronome.set_silent(SilentUpdate {
                    enabled: Some(!enabled),
                    ..Default::default()
                });
            }
            KeyCode::Char('r') => {
                let enabled = self.metronome.config().tempo_ramp.enabled;
                self.metronome.set_tempo_ramp(TempoRampUpdate {
                    enabled: Some(!enabled),
                    ..Default::default()
                });
            }
            KeyCode::Char('R') => {
                let mode = self.metronome.config().tempo_ramp.mode.flipped();
                self.metronome.set_tempo_ramp(TempoRampUpdate {
                    mode: Some(mode),
                    ..Default::default()
                });
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let mode = match self.timer.mode() {
                    TimerMode::Stopwatch => TimerMode::Countdown,
                    TimerMode::Countdown => TimerMode::Stopwatch,
                };
                self.timer.set_mode(mode);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => self.timer.toggle(),
            KeyCode::Char('x') | KeyCode::Char('X') => self.timer.reset(),
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.timer_sync = !self.timer_sync;
            }
            KeyCode::Char(',') => {
                let target = self.timer.target_minutes().saturating_sub(5);
                self.timer.set_target_minutes(target);
            }
            KeyCode::Char('.') => {
                self.timer.set_target_minutes(self.timer.target_minutes() + 5);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.save_preset(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.delete_selected_preset(),
            KeyCode::Char(c) if c.is_ascii_digit() => self.load_preset(c),
            _ => {}
        }
    }

    fn adjust_bpm(&mut self, delta: i16) {
        let bpm = i32::from(self.metronome.config().bpm) + i32::from(delta);
        self.metronome.set_bpm(bpm.clamp(0, u16::MAX as i32) as u16);
    }

    fn adjust_volume(&mut self, delta: i16) {
        let volume = i16::from(self.metronome.config().volume) + delta;
        let volume = volume.clamp(0, 100) as u8;
        self.metronome.set_volume(volume);
        self.handle.set_volume(volume);
    }

    fn clamp_cursor(&mut self) {
        let len = self.metronome.config().beat_pattern.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn save_preset(&mut self) {
        let name = format!("Preset {}", self.presets.list().len() + 1);
        match self.presets.save(&name, self.metronome.config()) {
            Ok(_) => self.status = format!("Saved {name}"),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn load_preset(&mut self, digit: char) {
        let index = match digit.to_digit(10) {
            Some(0) => 9,
            Some(digit) => digit as usize - 1,
            None => return,
        };
        let Some(preset) = self.presets.list().get(index) else {
            self.status = format!("No preset {}", (index + 1) % 10);
            return;
        };
        let name = preset.name.clone();
        let config = preset.config.clone();

        self.metronome.apply_config(config);
        let applied = self.metronome.config();
        self.handle.set_volume(applied.volume);
        self.handle.set_sound(applied.sound);
        self.selected_preset = Some(index);
        self.clamp_cursor();
        self.status = format!("Loaded {name}");
    }

    fn delete_selected_preset(&mut self) {
        let Some(index) = self.selected_preset else {
            self.status = String::from("Load a preset before deleting");
            return;
        };
        let Some(preset) = self.presets.list().get(index) else {
            self.selected_preset = None;
            return;
        };
        let id = preset.id.clone();
        let name = preset.name.clone();

        match self.presets.delete(&id) {
            Ok(()) => {
                self.selected_preset = None;
                self.status = format!("Deleted {name}");
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn ui_state(&self) -> UiState {
        UiState {
            config: self.metronome.config(),
            playing: self.metronome.is_playing(),
            beat: self.metronome.current_beat(),
            measure: self.metronome.current_measure(),
            silenced: self.metronome.is_measure_silenced(),
            cursor: self.cursor,
            timer_display: self.timer.display(),
            timer_mode: match self.timer.mode() {
                TimerMode::Stopwatch => String::from("stopwatch"),
                TimerMode::Countdown => {
                    format!("countdown from {} min", self.timer.target_minutes())
                }
            },
            timer_running: self.timer.is_running(),
            timer_sync: self.timer_sync,
            presets: self
                .presets
                .list()
                .iter()
                .map(|preset| preset.name.clone())
                .collect(),
            selected_preset: self.selected_preset,
            status: self.status.clone(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let state = self.ui_state();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(3), // Beat row
                Constraint::Min(7),    // Practice panel
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &state);
        render_beats(frame, chunks[1], &state);
        render_practice(frame, chunks[2], &state);

        let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
