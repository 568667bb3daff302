//! TUI module - terminal session runner with ratatui
//!
//! Draws the session engine's state and maps keys to its actions. Wall-clock
//! ticks are pumped into the engine on every loop iteration.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::cheers::{format_cheer, random_cheer, CheerKind};
use crate::clock::Clock;
use crate::db::DocumentStore;
use crate::model::Measure;
use crate::session::{Blocked, Phase, SessionEngine, SessionEvent, WallTicks};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App<S: DocumentStore, C: Clock> {
    engine: SessionEngine<S, C>,
    ticks: WallTicks,
    message: Option<String>,
    should_quit: bool,
}

impl<S: DocumentStore, C: Clock> App<S, C> {
    pub fn new(engine: SessionEngine<S, C>) -> Self {
        Self {
            engine,
            ticks: WallTicks::new(),
            message: None,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.main_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            for event in self.engine.pump(&mut self.ticks)? {
                self.on_event(event)?;
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let title = match self.engine.routine() {
            Some(routine) => format!("liftcycle - {}", routine.name),
            None => "liftcycle".to_string(),
        };
        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match self.engine.phase() {
            Phase::Resuming => self.render_resuming(frame, chunks[1]),
            Phase::Preview => self.render_preview(frame, chunks[1]),
            Phase::Active => self.render_active(frame, chunks[1]),
            Phase::ExerciseSummary => self.render_summary(frame, chunks[1]),
            Phase::Finished => {
                let done = Paragraph::new("Workout recorded.")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Done"));
                frame.render_widget(done, chunks[1]);
            }
        }

        let message = Paragraph::new(self.message.clone().unwrap_or_default())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(message, chunks[2]);

        let footer = Paragraph::new(self.key_help())
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn render_resuming(&self, frame: &mut Frame, area: Rect) {
        let text = match self.engine.pending_snapshot() {
            Some(saved) => format!(
                "You have an unfinished workout from today.\n\nExercise {}, set {}.\n\nResume it?",
                saved.exercise_index + 1,
                saved.current_set
            ),
            None => "You have an unfinished workout from today.".to_string(),
        };
        let body = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Workout in progress"));
        frame.render_widget(body, area);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let Some(routine) = self.engine.routine() else {
            let empty = Paragraph::new("Routine not found.")
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        };

        let rows: Vec<Row> = routine
            .exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(ex.name.clone()),
                    Cell::from(ex.kind_label()),
                    Cell::from(ex.summary()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(24),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["#", "Exercise", "Kind", "Plan"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Today's workout"));

        frame.render_widget(table, area);
    }

    fn render_active(&self, frame: &mut Frame, area: Rect) {
        let (Some(exercise), Some(desc)) = (self.engine.active_exercise(), self.engine.descriptor()) else {
            return;
        };
        let position = self.engine.position();

        let mut lines = Vec::new();
        if exercise.is_superset() {
            lines.push(Line::from(format!(
                "SUPERSET {} ({}/{})",
                exercise.name,
                position.sub_exercise_index + 1,
                exercise.sub_exercises().len()
            )).fg(Color::Magenta));
        }
        lines.push(Line::from(desc.name.to_string()).bold());
        lines.push(Line::from(""));

        if let Some(rest) = self.engine.rest_remaining() {
            lines.push(Line::from(format!("Rest: {}s", rest)).fg(Color::Green).bold());
            lines.push(Line::from(format!("Up next: set {} of {}", position.current_set, exercise.set_count)));
        } else {
            lines.push(Line::from(format!("Set {} of {}", position.current_set, exercise.set_count)));
            let target = self.engine.current_target().unwrap_or(0);
            lines.push(match desc.measure {
                Measure::Reps => Line::from(format!("{} reps", target)),
                Measure::Time => Line::from(format!("Target: {} seconds", target)),
            });
            if let Some(left) = self.engine.countdown_remaining() {
                lines.push(Line::from(format!("Time left: {}s", left)).fg(Color::Red).bold());
            }
            if position.current_set == exercise.set_count
                && self.engine.countdown_remaining().is_none()
                && let Some(next) = self.engine.next_exercise()
            {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("Next: {}", next.name)).fg(Color::DarkGray));
            }
        }

        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Exercise {}",
                position.exercise_index + 1
            )));
        frame.render_widget(body, area);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let Some(routine) = self.engine.routine() else {
            return;
        };
        let done_through = self.engine.position().exercise_index;

        let rows: Vec<Row> = routine
            .exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                let mark = if i <= done_through { "✓" } else { " " };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(ex.name.clone()),
                    Cell::from(ex.summary()),
                ])
                .style(if i <= done_through {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                })
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(3), Constraint::Length(24), Constraint::Min(20)])
            .block(Block::default().borders(Borders::ALL).title("Progress"));
        frame.render_widget(table, area);
    }

    fn key_help(&self) -> &'static str {
        match self.engine.phase() {
            Phase::Resuming => "r: resume | d: discard | q: quit",
            Phase::Preview => "enter: start workout | q: quit",
            Phase::Active if self.engine.countdown_remaining().is_some() => "s: stop early",
            Phase::Active if self.engine.is_resting() => "resting... | f: finish workout | q: quit",
            Phase::Active => "enter: complete set | f: finish workout | q: quit (progress is saved)",
            Phase::ExerciseSummary if self.engine.next_exercise().is_some() => {
                "enter: next exercise | f: finish workout | q: quit"
            }
            Phase::ExerciseSummary => "enter: finish routine | q: quit",
            Phase::Finished => "q: quit",
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let outcome = match (self.engine.phase(), key.code) {
                (_, KeyCode::Char('q')) => {
                    self.should_quit = true;
                    None
                }
                (Phase::Resuming, KeyCode::Char('r')) => Some(self.engine.resume()?),
                (Phase::Resuming, KeyCode::Char('d')) => Some(self.engine.discard_snapshot()?),
                (Phase::Preview, KeyCode::Enter) => Some(self.engine.begin()?),
                (Phase::Active, KeyCode::Enter | KeyCode::Char(' ')) => Some(self.engine.complete_set()?),
                (Phase::Active, KeyCode::Char('s')) => Some(self.engine.stop_early()?),
                (Phase::ExerciseSummary, KeyCode::Enter) => Some(self.engine.continue_next()?),
                (Phase::Active | Phase::ExerciseSummary, KeyCode::Char('f')) => {
                    match self.engine.terminate()? {
                        SessionEvent::Finished(_) => {
                            self.message = Some(format_cheer(random_cheer(CheerKind::CutShort)));
                            None
                        }
                        other => Some(other),
                    }
                }
                _ => None,
            };
            if let Some(event) = outcome {
                self.on_event(event)?;
            }
        }
        Ok(())
    }

    fn on_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::CountdownStarted { .. } => {
                self.ticks.reset();
                self.message = None;
            }
            SessionEvent::NextSet { rest_secs: Some(_), .. } => {
                self.ticks.reset();
                self.message = None;
            }
            SessionEvent::RestFinished => {
                stdout().execute(Print('\u{7}'))?;
                self.message = Some("Rest over, go!".to_string());
            }
            SessionEvent::ExerciseCompleted { .. } => {
                self.message = Some("Exercise complete.".to_string());
            }
            SessionEvent::Finished(_) => {
                self.message = Some(format_cheer(random_cheer(CheerKind::Finished)));
            }
            SessionEvent::Exit => self.should_quit = true,
            SessionEvent::Blocked(Blocked::Resting) => {
                self.message = Some("Still resting.".to_string());
            }
            SessionEvent::Blocked(_) => {}
            _ => self.message = None,
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
