use crate::ai::Agent;
use crate::game::is_legal_action;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::{App, AI, HUMAN};

/// Stones drawn per line in the pile widget.
const STONES_PER_LINE: u32 = 7;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Pile + side panels
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(chunks[1]);

    render_header(frame, app, chunks[0]);
    render_pile(frame, app, body[0]);
    render_q_values(frame, app, body[1]);
    render_moves(frame, app, body[2]);
    render_message(frame, app.message(), chunks[2]);
    render_controls(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.game_state();
    let score = app.score();

    let (status, color) = if state.is_terminal() {
        ("Game Over".to_string(), Color::Magenta)
    } else if state.current_player() == HUMAN {
        ("Your turn".to_string(), Color::Cyan)
    } else {
        ("AI is thinking...".to_string(), Color::Yellow)
    };

    let text = format!(
        "{}  |  Score  You {} : {} AI  |  Opponent: {}",
        status,
        score.human,
        score.ai,
        app.ai().name()
    );

    let header = Paragraph::new(text)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("21 Stones"));

    frame.render_widget(header, area);
}

fn render_pile(frame: &mut Frame, app: &App, area: Rect) {
    let remaining = app.game_state().stones_remaining();
    let total = app.initial_stones();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} of {} stones left", remaining, total),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    // Remaining stones solid, removed ones dimmed.
    let mut row = Vec::new();
    for i in 0..total {
        let span = if i < remaining {
            Span::styled(" ● ", Style::default().fg(Color::White))
        } else {
            Span::styled(" · ", Style::default().fg(Color::DarkGray))
        };
        row.push(span);
        if (i + 1) % STONES_PER_LINE == 0 {
            lines.push(Line::from(std::mem::take(&mut row)));
        }
    }
    if !row.is_empty() {
        lines.push(Line::from(row));
    }

    let pile = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Pile"));
    frame.render_widget(pile, area);
}

fn render_q_values(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    match (app.ai().table(), app.last_ai_move()) {
        (None, _) => {
            lines.push(Line::from("No Q-table loaded."));
            lines.push(Line::from("AI plays the heuristic."));
        }
        (Some(_), None) => {
            lines.push(Line::from("Waiting for the AI's first move."));
        }
        (Some(table), Some(ai_move)) => {
            let stones = ai_move.stones_before;
            lines.push(Line::from(format!("Pile of {}:", stones)));
            match table.row(stones) {
                Some(row) => {
                    for (action, value) in row.iter().enumerate() {
                        let label = format!("take {}: {:>8.3}", action + 1, value);
                        let style = if action == ai_move.decision.action {
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD)
                        } else if !is_legal_action(action, stones) {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default()
                        };
                        lines.push(Line::from(Span::styled(label, style)));
                    }
                }
                None => lines.push(Line::from("No row for this pile; heuristic used.")),
            }
        }
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("AI Q-values"));
    frame.render_widget(panel, area);
}

fn render_moves(frame: &mut Frame, app: &App, area: Rect) {
    // Most recent moves that fit, newest last.
    let visible = area.height.saturating_sub(2) as usize;
    let moves = app.moves();
    let start = moves.len().saturating_sub(visible);

    let lines: Vec<Line> = moves[start..]
        .iter()
        .map(|m| {
            let (who, color) = if m.player == AI {
                ("AI ", Color::Yellow)
            } else {
                ("You", Color::Cyan)
            };
            Line::from(vec![
                Span::styled(who, Style::default().fg(color)),
                Span::raw(format!(" took {} ({} left)", m.taken, m.remaining)),
            ])
        })
        .collect();

    let log = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Moves"));
    frame.render_widget(log, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let text = message.unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new("1/2/3: Take stones  |  R: Restart  |  Q: Quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{QTable, TableAgent};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_renders_pile_and_controls() {
        let app = App::new(TableAgent::seeded(None, 1), 21, Duration::ZERO);
        let text = screen_text(&app);
        assert!(text.contains("21 of 21 stones left"));
        assert!(text.contains("No Q-table loaded."));
        assert!(text.contains("R: Restart"));
    }

    #[test]
    fn test_renders_q_values_after_ai_move() {
        let table = QTable::from_rows(vec![[0.25, 0.5, -1.0]; 22]);
        let mut app = App::new(TableAgent::seeded(Some(table), 1), 21, Duration::ZERO);
        app.human_move(0);
        app.tick(Instant::now());
        let text = screen_text(&app);
        assert!(text.contains("Pile of 20:"));
        assert!(text.contains("take 2:"));
        assert!(text.contains("took 2 (18 left)"));
    }
}
