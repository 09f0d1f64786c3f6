use std::io::Stdout;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::warn;

use crate::crypto::PinStore;
use crate::monitor::shutdown_requested;
use crate::theme::Theme;
use crate::ui::app::{AppState, Mode, StatusLevel};
use crate::ui::panel::Panel;
use crate::ui::unlock::{PinPrompt, PromptEvent};
use crate::utils::{MAX_DISPLAY_LENGTH, POLL_INTERVAL_MS, truncate_label};

type Term = Terminal<CrosstermBackend<Stdout>>;

// ============================================================================
// TERMINAL SETUP
// ============================================================================

fn open_terminal() -> anyhow::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn close_terminal(terminal: &mut Term) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Read the next key press, or `None` if nothing arrived within the poll
/// interval.
fn poll_key() -> anyhow::Result<Option<KeyEvent>> {
    if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
        if let CrosstermEvent::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

// ============================================================================
// UNLOCK SCREEN
// ============================================================================

/// Ask for the PIN if one is set. Returns false when the user cancelled or
/// ran out of attempts.
pub fn unlock(pins: &PinStore, shutdown: &AtomicBool) -> anyhow::Result<bool> {
    if !pins.is_set() {
        return Ok(true);
    }

    let mut terminal = open_terminal()?;
    let result = unlock_loop(&mut terminal, pins, shutdown);
    close_terminal(&mut terminal)?;
    result
}

fn unlock_loop(terminal: &mut Term, pins: &PinStore, shutdown: &AtomicBool) -> anyhow::Result<bool> {
    let theme = Theme::mono();
    let mut prompt = PinPrompt::new();
    let mut message = String::from("Enter PIN to unlock");

    loop {
        terminal.draw(|f| render_unlock(f, &theme, &prompt, &message))?;

        if shutdown_requested(shutdown) {
            return Ok(false);
        }
        let Some(key) = poll_key()? else {
            continue;
        };

        match prompt.handle_key(key.code) {
            PromptEvent::Pending => {}
            PromptEvent::Cancel => {
                warn!("PIN entry cancelled, exiting");
                return Ok(false);
            }
            PromptEvent::Submit(pin) => match pins.verify(&pin) {
                Ok(true) => return Ok(true),
                Ok(false) => {
                    if prompt.record_failure() {
                        warn!("too many wrong PINs, exiting");
                        return Ok(false);
                    }
                    message = format!("Incorrect PIN. {} attempt(s) left", prompt.attempts_left());
                }
                Err(err) => {
                    warn!(error = %err, "PIN file unusable");
                    return Err(err.into());
                }
            },
        }
    }
}

fn render_unlock(f: &mut Frame, theme: &Theme, prompt: &PinPrompt, message: &str) {
    let text_color = theme.header_bar_text_color.or(Color::White);
    let area = centered(f.area(), 40, 7);

    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(text_color))),
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {:<4} ]", prompt.masked()),
            Style::default()
                .fg(theme.input_field_text_color.or(Color::White))
                .add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Clickboard ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_color.or(Color::White))),
    );

    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

// ============================================================================
// PANEL SCREEN
// ============================================================================

pub fn show_ui(panel: &mut Panel, state: &mut AppState, shutdown: &AtomicBool) -> anyhow::Result<()> {
    let mut terminal = open_terminal()?;
    let result = panel_loop(&mut terminal, panel, state, shutdown);
    close_terminal(&mut terminal)?;
    result
}

fn panel_loop(
    terminal: &mut Term,
    panel: &mut Panel,
    state: &mut AppState,
    shutdown: &AtomicBool,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| render_panel(f, panel, state))?;

        if shutdown_requested(shutdown) {
            state.quit();
        }
        if state.should_quit {
            return Ok(());
        }

        if let Some(key) = poll_key()? {
            let selection = panel.selection(state);
            if let Some(action) = state.handle_key(key.code, panel.board.len(), selection) {
                panel.apply(state, action);
            }
        }
    }
}

fn render_panel(f: &mut Frame, panel: &Panel, state: &mut AppState) {
    let theme = &panel.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(format!(" Clickboard ({}) ", panel.board.len())).style(
        Style::default()
            .bg(theme.header_bar_color.or(Color::Reset))
            .fg(theme.header_bar_text_color.or(Color::Cyan))
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(header, chunks[0]);

    render_entries(f, panel, state, chunks[1]);

    let status = match &state.status {
        Some(status) => {
            let color = match status.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Warn => Color::Yellow,
                StatusLevel::Error => Color::Red,
            };
            Paragraph::new(status.message.clone()).style(Style::default().fg(color))
        }
        None => Paragraph::new(""),
    };
    f.render_widget(status, chunks[2]);

    let footer = Paragraph::new(
        "Enter: Copy │ a: Add │ f: File │ r: Rename │ e: Edit │ d: Delete │ C: Clear │ p: PIN │ t: Theme │ q: Quit",
    )
    .style(
        Style::default()
            .bg(theme.title_bar_color.or(Color::Reset))
            .fg(Color::DarkGray),
    )
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[3]);

    match &state.mode {
        Mode::Browse => {}
        Mode::Input { purpose, buffer } => {
            let shown = if purpose.is_secret() {
                "*".repeat(buffer.len())
            } else {
                buffer.clone()
            };
            let area = centered(f.area(), 70, 3);
            let input = Paragraph::new(format!("{}█", shown))
                .style(
                    Style::default()
                        .bg(theme.input_field_color.or(Color::Reset))
                        .fg(theme.input_field_text_color.or(Color::White)),
                )
                .block(
                    Block::default()
                        .title(purpose.title())
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(theme.border_color.or(Color::Cyan))),
                );
            f.render_widget(Clear, area);
            f.render_widget(input, area);
        }
        Mode::ConfirmDelete(index) => {
            let name = panel
                .board
                .get(*index)
                .map(|e| truncate_label(&e.display_name, 40))
                .unwrap_or_default();
            render_confirm(f, &format!("Delete \"{}\"?", name), "This entry will be removed.");
        }
        Mode::ConfirmClear => render_confirm(
            f,
            "Delete all entries?",
            "This will permanently delete every saved entry.",
        ),
        Mode::PinMenu => {
            let current = if panel.pins.is_set() {
                "A PIN is set."
            } else {
                "No PIN is set."
            };
            let area = centered(f.area(), 50, 7);
            let menu = Paragraph::new(vec![
                Line::from(""),
                Line::from(current),
                Line::from(""),
                Line::from(Span::styled(
                    "S: Set / change PIN  •  R: Remove PIN  •  Esc: Back",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" PIN ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_color.or(Color::Cyan))),
            );
            f.render_widget(Clear, area);
            f.render_widget(menu, area);
        }
    }
}

fn render_entries(f: &mut Frame, panel: &Panel, state: &mut AppState, area: Rect) {
    let theme = &panel.theme;
    let border = Style::default().fg(theme.border_color.or(Color::Cyan));

    if panel.board.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No saved entries",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press a to add text or f to add an image or audio file",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(empty, area);
        return;
    }

    let button_fg = theme.button_text_color.or(Color::White);
    let items: Vec<ListItem> = panel
        .board
        .entries()
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", entry.icon()), Style::default().fg(Color::Cyan)),
                Span::styled(
                    truncate_label(&entry.display_name, MAX_DISPLAY_LENGTH),
                    Style::default().fg(button_fg),
                ),
                Span::styled(
                    format!("  {}", entry.metadata_label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type(theme))
                .border_style(border)
                .style(Style::default().bg(theme.background_color.or(Color::Reset))),
        )
        .highlight_style(
            Style::default()
                .bg(theme.button_color.or(Color::Blue))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn border_type(theme: &Theme) -> BorderType {
    if theme.border_thickness > 1 {
        BorderType::Thick
    } else {
        BorderType::Plain
    }
}

fn render_confirm(f: &mut Frame, title: &str, detail: &str) {
    let area = centered(f.area(), 60, 9);
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(detail.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Y to confirm • N or Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );

    f.render_widget(Clear, area);
    f.render_widget(text, area);
}

/// A rectangle of `percent_x` width and `height` rows in the middle of `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
