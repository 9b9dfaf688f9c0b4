//! Terminal UI rendering with ratatui
//!
//! Everything here reads a [`GameView`] snapshot; the renderer never touches
//! the session itself.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::{GameView, NotificationKind, Phase};
use crate::settings::Settings;
use crate::tetromino::TetrominoType;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(18) = 52
const GAME_WIDTH: u16 = 52;
/// Board rows plus borders
const GAME_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;

/// Scale an RGB color toward black. Named colors pass through untouched.
pub fn fade(color: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => {
            let scale = |c: u8| (f32::from(c) * alpha).round() as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

/// Mix an RGB color toward white by `amount`
pub fn flash(color: Color, amount: f32) -> Color {
    let amount = amount.clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => {
            let mix = |c: u8| (f32::from(c) + (255.0 - f32::from(c)) * amount).round() as u8;
            Color::Rgb(mix(r), mix(g), mix(b))
        }
        _ if amount >= 0.5 => Color::White,
        other => other,
    }
}

fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Combo => Color::Rgb(255, 0, 255),
        NotificationKind::Double => Color::Rgb(0, 245, 255),
        NotificationKind::Triple => Color::Rgb(57, 255, 20),
        NotificationKind::Tetris => Color::Rgb(255, 215, 0),
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, view: &GameView, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Hold box
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(18), // Next + stats
        ])
        .split(game_area);

    render_hold(frame, main_layout[0], view, block_char);
    render_board(frame, main_layout[1], view, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(12)])
        .split(main_layout[2]);

    render_next(frame, right_layout[0], view.next, block_char);
    render_stats(frame, right_layout[1], view);

    match view.phase {
        Phase::Idle => render_overlay(frame, area, "NEONTRIS", "Press Enter to start"),
        Phase::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        Phase::GameOver => {
            let subtitle = format!("Score {}  R to restart", view.score.points);
            render_overlay(frame, area, "GAME OVER", &subtitle);
        }
        Phase::Running | Phase::Clearing(_) => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box, dimmed once hold is spent
fn render_hold(frame: &mut Frame, area: Rect, view: &GameView, block_char: &str) {
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = view.hold {
        let alpha = if view.hold_used { 0.35 } else { 1.0 };
        render_mini_piece(frame, inner, piece_type, block_char, alpha);
    }
}

fn render_next(frame: &mut Frame, area: Rect, next: Option<TetrominoType>, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = next {
        render_mini_piece(frame, inner, piece_type, block_char, 1.0);
    }
}

/// Occupied cells of a piece's spawn state, trimmed to its bounding box
pub fn mini_rows(piece_type: TetrominoType) -> Vec<Vec<bool>> {
    let shape = piece_type.shape(0);
    let blocks: Vec<(i32, i32)> = shape.blocks().collect();
    let (Some(min_row), Some(max_row), Some(min_col), Some(max_col)) = (
        blocks.iter().map(|&(r, _)| r).min(),
        blocks.iter().map(|&(r, _)| r).max(),
        blocks.iter().map(|&(_, c)| c).min(),
        blocks.iter().map(|&(_, c)| c).max(),
    ) else {
        return Vec::new();
    };

    (min_row..=max_row)
        .map(|row| {
            (min_col..=max_col)
                .map(|col| blocks.contains(&(row, col)))
                .collect()
        })
        .collect()
}

/// Render a small piece preview (for hold and next)
fn render_mini_piece(
    frame: &mut Frame,
    area: Rect,
    piece_type: TetrominoType,
    block_char: &str,
    alpha: f32,
) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let style = Style::default().fg(fade(piece_type.color(), alpha));
    let lines: Vec<Line> = mini_rows(piece_type)
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|filled| {
                        if filled {
                            Span::styled(block_char, style)
                        } else {
                            Span::raw(EMPTY)
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let y_pad = area.height.saturating_sub(lines.len() as u16) / 2;
    let area = Rect {
        y: area.y + y_pad,
        height: area.height - y_pad,
        ..area
    };
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, view: &GameView, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost;

    let block = Block::default()
        .title(" NEONTRIS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(0, 245, 255)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active: Vec<(i32, i32)> = view.active.map(|p| p.blocks().collect()).unwrap_or_default();
    let ghost: Vec<(i32, i32)> = match (view.active, view.ghost_row) {
        (Some(piece), Some(row)) if show_ghost && row != piece.row => {
            let mut landed = piece;
            landed.row = row;
            landed.blocks().collect()
        }
        _ => Vec::new(),
    };
    let (clearing, flash_alpha) = match view.phase {
        Phase::Clearing(animation) => (animation.rows(), animation.flash_alpha()),
        _ => (&[][..], 0.0),
    };
    let active_color = view.active.map(|p| fade(p.kind.color(), view.active_alpha));

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT);
    for (row, cells) in view.board.rows().iter().enumerate() {
        let is_clearing = clearing.contains(&row);
        let spans: Vec<Span> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let pos = (row as i32, col as i32);
                if let (true, Some(color)) = (active.contains(&pos), active_color) {
                    return Span::styled(block_char, Style::default().fg(color));
                }
                match cell {
                    Some(kind) if is_clearing => Span::styled(
                        block_char,
                        Style::default().fg(flash(kind.color(), flash_alpha)),
                    ),
                    Some(kind) => Span::styled(block_char, Style::default().fg(kind.color())),
                    None if ghost.contains(&pos) => {
                        let color = view.active.map_or(Color::DarkGray, |p| p.kind.color());
                        Span::styled(ghost_char, Style::default().fg(fade(color, 0.4)))
                    }
                    None => Span::raw(EMPTY),
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
    render_notifications(frame, inner, view);
}

/// Floating texts, stacked from a third of the way down the board
fn render_notifications(frame: &mut Frame, board: Rect, view: &GameView) {
    let top = board.y + board.height / 3;
    for (i, notification) in view.notifications.iter().rev().take(4).enumerate() {
        // Drift upward as they age
        let rise = ((1.0 - notification.life()) * 3.0) as u16;
        let y = (top + i as u16 * 2).saturating_sub(rise);
        if y < board.y || y >= board.y + board.height {
            continue;
        }
        let color = fade(notification_color(notification.kind), notification.life());
        let line = Line::styled(notification.text.as_str(), Style::default().fg(color).bold());
        let area = Rect {
            x: board.x,
            y,
            width: board.width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, view: &GameView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));
    let score = view.score;
    let volume = if view.muted {
        "muted".to_string()
    } else {
        format!("{}%", view.volume)
    };

    let mut lines = vec![
        label("SCORE"),
        Line::styled(score.points.to_string(), Style::default().fg(Color::Yellow).bold()),
        label("BEST"),
        Line::styled(
            view.high_score.max(score.points).to_string(),
            Style::default().fg(Color::Rgb(255, 0, 255)),
        ),
        label("LEVEL"),
        Line::styled(score.level.to_string(), Style::default().fg(Color::Cyan)),
        label("LINES"),
        Line::styled(score.lines.to_string(), Style::default().fg(Color::Green)),
    ];
    if score.combo > 1 {
        lines.push(label("COMBO"));
        lines.push(Line::styled(
            format!("×{}", score.combo),
            Style::default().fg(Color::Magenta).bold(),
        ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("♪ {volume}"),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for idle/pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 28u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, Game, GameConfig};
    use crate::storage::MemoryStore;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn fade_scales_rgb() {
        assert_eq!(fade(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(fade(Color::Rgb(200, 100, 0), 1.0), Color::Rgb(200, 100, 0));
        assert_eq!(fade(Color::Gray, 0.1), Color::Gray);
    }

    #[test]
    fn flash_mixes_to_white() {
        assert_eq!(flash(Color::Rgb(0, 0, 0), 1.0), Color::Rgb(255, 255, 255));
        assert_eq!(flash(Color::Rgb(10, 20, 30), 0.0), Color::Rgb(10, 20, 30));
    }

    #[test]
    fn mini_rows_trim_to_bounding_box() {
        assert_eq!(mini_rows(TetrominoType::I), vec![vec![true; 4]]);
        assert_eq!(mini_rows(TetrominoType::O), vec![vec![true, true], vec![true, true]]);
        assert_eq!(
            mini_rows(TetrominoType::T),
            vec![vec![false, true, false], vec![true, true, true]]
        );
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_each_phase() {
        let mut game = Game::new(
            GameConfig {
                seed: Some(5),
                ..GameConfig::default()
            },
            Box::new(MemoryStore::new(1234)),
        );
        let settings = Settings::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|f| render_game(f, &game.view(), &settings)).unwrap();
        assert!(buffer_text(&terminal).contains("Press Enter to start"));

        game.apply(Command::Start);
        terminal.draw(|f| render_game(f, &game.view(), &settings)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("HOLD"));
        assert!(text.contains("1234"));

        game.apply(Command::TogglePause);
        terminal.draw(|f| render_game(f, &game.view(), &settings)).unwrap();
        assert!(buffer_text(&terminal).contains("PAUSED"));
    }
}
