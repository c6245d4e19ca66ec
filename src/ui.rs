use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::app::{App, ArtworkState};
use crate::artwork;

/// Columns kept free on each side of the song line.
const TEXT_MARGIN: u16 = 2;

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    // Bottom-up: song line, separator, everything else is art.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let art_area = rows[0];
    render_separator(f, rows[1]);
    render_song_line(f, rows[2], app);

    if app.show_vinyl {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(art_area);
        render_art(f, halves[0], app);
        render_vinyl(f, halves[1], app);
    } else {
        render_art(f, art_area, app);
    }
}

/// Largest square of terminal cells (a cell is twice as tall as wide)
/// centered in `area`.
fn square_in(area: Rect) -> Rect {
    let side_cols = area.width.min(area.height.saturating_mul(2)).max(1);
    let rows = (side_cols / 2).max(1);
    let cols = rows * 2;
    Rect {
        x: area.x + (area.width.saturating_sub(cols)) / 2,
        y: area.y + (area.height.saturating_sub(rows)) / 2,
        width: cols.min(area.width),
        height: rows.min(area.height),
    }
}

fn render_art(f: &mut Frame, area: Rect, app: &App) {
    let target = square_in(area);
    match app.artwork.image() {
        Some(img) => {
            let lines = artwork::render_half_blocks(img, target.width, target.height);
            f.render_widget(Paragraph::new(lines), target);
        }
        None => {
            let hint = Paragraph::new(art_hint(&app.artwork, app.track.is_some()))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(hint, centered_line(area));
        }
    }
}

/// Placeholder for the art pane when no frame is on screen.
fn art_hint(state: &ArtworkState, has_track: bool) -> &'static str {
    match state {
        ArtworkState::Failed => "Artwork unavailable",
        ArtworkState::Loading => "Loading artwork…",
        _ if has_track => "Loading artwork…",
        _ => "Nothing playing",
    }
}

fn render_vinyl(f: &mut Frame, area: Rect, app: &App) {
    let target = square_in(area);
    let frame = app.vinyl.frame();
    let lines = artwork::render_rgba_half_blocks(&frame, target.width, target.height);
    f.render_widget(Paragraph::new(lines), target);

    // Song/artist label over the disc center.
    let label = app.vinyl.label();
    if !label.is_empty() && target.height >= 4 {
        let lines: Vec<Line> = label.lines().map(Line::from).collect();
        let height = lines.len() as u16;
        let label_area = Rect {
            x: target.x,
            y: target.y + (target.height - height.min(target.height)) / 2,
            width: target.width,
            height: height.min(target.height),
        };
        f.render_widget(Clear, label_area);
        let label = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(label, label_area);
    }
}

fn render_separator(f: &mut Frame, area: Rect) {
    let line = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::White)),
        area,
    );
}

fn render_song_line(f: &mut Frame, area: Rect, app: &mut App) {
    let width = area.width.saturating_sub(TEXT_MARGIN * 2) as usize;
    app.scroller.resize(width.max(1));

    let text = Paragraph::new(app.display_text())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(text, area);
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: 1.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_art_gets_its_own_hint() {
        assert_eq!(art_hint(&ArtworkState::Failed, true), "Artwork unavailable");
        assert_eq!(art_hint(&ArtworkState::Loading, true), "Loading artwork…");
        assert_eq!(art_hint(&ArtworkState::Idle, true), "Loading artwork…");
        assert_eq!(art_hint(&ArtworkState::Idle, false), "Nothing playing");
    }
}
