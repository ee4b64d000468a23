use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use super::{high_score_lines, render_hud, render_phrase, render_playfield, split, Scene};
use crate::game::GameState;

/// One screen of the game, chosen by state.
pub trait Screen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer);
}

/// Title, instructions and the high score table.
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer) {
        let title_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let mut lines = vec![
            Line::from(Span::styled("NO MIRES", title_style)),
            Line::from(""),
            Line::from(Span::styled(
                "Memorize the phrase. Close your eyes. Type it before the walls meet.",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled(
                "Walls rush in while your eyes are open and creep while they are closed.",
                dim,
            )),
            Line::from(Span::styled(
                "Every wrong key makes them faster for the rest of the run.",
                dim,
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Playing as "),
                Span::styled(
                    scene.player_name.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled("High scores", title_style)),
        ];
        lines.extend(high_score_lines(scene.high_scores));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: start    Esc: quit",
            Style::default().fg(Color::Green),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// HUD, walls, player and phrase. Used while memorizing and playing.
pub struct PlayfieldScreen;

impl Screen for PlayfieldScreen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer) {
        let (hud, field, phrase) = split(area);
        render_hud(scene, hud, buf);
        render_playfield(scene, field, buf);
        render_phrase(scene, phrase, buf);
    }
}

/// Playfield with a centered message box on top.
fn render_overlay(scene: &Scene, title: &str, lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let (hud, field, _) = split(area);
    render_hud(scene, hud, buf);
    render_playfield(scene, field, buf);

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = (area.width * 3 / 4).max(20).min(area.width);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1]);
    let popup = horizontal[1];

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {title} "),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
        )
        .render(popup, buf);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

pub struct LevelCompleteScreen;

impl Screen for LevelCompleteScreen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer) {
        let view = &scene.game;
        let s = &view.score;
        let mut lines = vec![
            stat_line("WPM", s.wpm.to_string()),
            stat_line("Accuracy", format!("{}%", s.accuracy)),
            stat_line("Max combo", s.max_combo.to_string()),
            stat_line("Eyes closed", format!("{:.1}s", s.eyes_closed_secs)),
            stat_line("Level score", view.last_level_score.to_string()),
            stat_line("Total", s.total_score.to_string()),
            Line::from(""),
        ];
        let next = if view.level_number as usize >= view.total_levels {
            "Enter: finish"
        } else {
            "Enter: next level"
        };
        lines.push(Line::from(Span::styled(
            next,
            Style::default().fg(Color::Green),
        )));

        render_overlay(
            scene,
            &format!("Level {} complete", view.level_number),
            lines,
            area,
            buf,
        );
    }
}

pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer) {
        let view = &scene.game;
        let mut lines = vec![
            Line::from(Span::styled(
                "CRUSHED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            stat_line("Reached level", view.level_number.to_string()),
            stat_line("Total score", view.score.total_score.to_string()),
            Line::from(""),
        ];
        lines.extend(high_score_lines(scene.high_scores));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: try again    Esc: quit",
            Style::default().fg(Color::Green),
        )));
        render_overlay(scene, "Game over", lines, area, buf);
    }
}

pub struct GameCompleteScreen;

impl Screen for GameCompleteScreen {
    fn render(&self, scene: &Scene, area: Rect, buf: &mut Buffer) {
        let view = &scene.game;
        let mut lines = vec![
            Line::from(Span::styled(
                "All levels cleared!",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            stat_line("Final score", view.score.total_score.to_string()),
            Line::from(""),
        ];
        lines.extend(high_score_lines(scene.high_scores));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: play again    Esc: quit",
            Style::default().fg(Color::Green),
        )));
        render_overlay(scene, "Victory", lines, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: GameState) -> Box<dyn Screen> {
    match state {
        GameState::Menu => Box::new(MenuScreen),
        GameState::Memorizing | GameState::Playing => Box::new(PlayfieldScreen),
        GameState::LevelComplete => Box::new(LevelCompleteScreen),
        GameState::GameOver => Box::new(GameOverScreen),
        GameState::GameComplete => Box::new(GameCompleteScreen),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixed_game, render_to_string};
    use crate::game::{GameState, InputEvent};
    use crate::highscores::ScoreRecord;
    use std::time::Duration;

    fn record(name: &str, score: u64) -> ScoreRecord {
        ScoreRecord {
            name: name.into(),
            score,
            wpm: 40,
            accuracy: 100,
            max_combo: 10,
            achieved_at: None,
        }
    }

    #[test]
    fn menu_lists_high_scores() {
        let game = fixed_game("ab");
        let rendered = render_to_string(&game, Duration::ZERO, &[record("Luz", 960)]);
        assert!(rendered.contains("NO MIRES"));
        assert!(rendered.contains("Luz"));
        assert!(rendered.contains("960"));
        assert!(rendered.contains("Playing as Ana"));
    }

    #[test]
    fn menu_without_scores() {
        let game = fixed_game("ab");
        let rendered = render_to_string(&game, Duration::ZERO, &[]);
        assert!(rendered.contains("no scores yet"));
    }

    #[test]
    fn level_complete_shows_breakdown() {
        let mut game = fixed_game("ab");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        game.tick(Duration::from_secs(5), true);
        game.handle_input(InputEvent::Char('a'), Duration::from_secs(6));
        game.handle_input(InputEvent::Char('b'), Duration::from_secs(6));
        assert_eq!(game.state(), GameState::LevelComplete);

        let rendered = render_to_string(&game, Duration::from_secs(6), &[]);
        assert!(rendered.contains("Level 1 complete"));
        assert!(rendered.contains("Accuracy"));
        assert!(rendered.contains("100%"));
        assert!(rendered.contains("Enter: next level"));
    }

    #[test]
    fn game_over_overlay() {
        let mut game = fixed_game("never");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        let mut now = Duration::from_secs(5);
        game.tick(now, true);
        while game.state() == GameState::Playing {
            now += Duration::from_millis(16);
            game.tick(now, true);
        }
        let rendered = render_to_string(&game, now, &[record("Luz", 50)]);
        assert!(rendered.contains("CRUSHED"));
        assert!(rendered.contains("Enter: try again"));
        assert!(rendered.contains("Luz"));
    }
}
