pub mod screen;

use std::io;

use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Terminal,
};

use crate::assets::Sprite;
use crate::constants::{GROUND_Y, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::effects::{BurstKind, Particle};
use crate::game::{GameState, GameView};
use crate::highscores::ScoreRecord;
use crate::typing::Outcome;

const HUD_HEIGHT: u16 = 1;
const PHRASE_HEIGHT: u16 = 4;
const HORIZONTAL_MARGIN: u16 = 2;

/// Everything drawn in one frame.
pub struct Scene<'a> {
    pub game: GameView<'a>,
    pub particles: &'a [Particle],
    /// Horizontal playfield offset, in playfield units.
    pub shake: f64,
    pub high_scores: &'a [ScoreRecord],
    pub sprite: &'a Sprite,
    pub player_name: &'a str,
}

/// Something that can show a frame.
pub trait RenderSink {
    fn draw(&mut self, scene: &Scene) -> io::Result<()>;
}

pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> RenderSink for TerminalRenderer<B> {
    fn draw(&mut self, scene: &Scene) -> io::Result<()> {
        self.terminal.draw(|f| f.render_widget(scene, f.area()))?;
        Ok(())
    }
}

impl Widget for &Scene<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.game.state).render(self, area, buf);
    }
}

/// Split the terminal into HUD, playfield and phrase rows.
pub(crate) fn split(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HUD_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(PHRASE_HEIGHT),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Playfield x to terminal column.
fn col(area: Rect, x: f64) -> i32 {
    area.x as i32 + (x * area.width as f64 / PLAYFIELD_WIDTH).floor() as i32
}

/// Playfield y to terminal row.
fn row(area: Rect, y: f64) -> i32 {
    area.y as i32 + (y * area.height as f64 / PLAYFIELD_HEIGHT).floor() as i32
}

fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    let inside = x >= area.x as i32
        && y >= area.y as i32
        && x < area.right() as i32
        && y < area.bottom() as i32;
    if !inside {
        return;
    }
    if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
        cell.set_symbol(symbol);
        cell.set_style(style);
    }
}

/// White when safe, through yellow, to red at contact.
pub fn danger_color(danger: f64) -> Color {
    let d = danger.clamp(0.0, 1.0);
    if d < 0.5 {
        Color::Rgb(255, 255, (255.0 * (1.0 - 2.0 * d)) as u8)
    } else {
        Color::Rgb(255, (255.0 * (2.0 - 2.0 * d)) as u8, 0)
    }
}

pub(crate) fn render_hud(scene: &Scene, area: Rect, buf: &mut Buffer) {
    let view = &scene.game;
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let eyes = if view.eyes_open {
        Span::styled("eyes open", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("eyes closed", Style::default().fg(Color::Cyan))
    };

    let mut spans = vec![
        Span::styled(
            format!("Level {}/{}", view.level_number, view.total_levels),
            bold,
        ),
        Span::styled("  score ", dim),
        Span::styled(view.score.total_score.to_string(), bold),
        Span::styled("  combo ", dim),
        Span::raw(view.score.max_combo.to_string()),
        Span::styled("  speed ", dim),
        Span::raw(format!("{:.2}", view.wall_speed)),
        Span::raw("  "),
        eyes,
    ];
    if view.frozen && view.state == GameState::Playing {
        spans.push(Span::styled(
            "  FROZEN",
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
        ));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}

pub(crate) fn render_playfield(scene: &Scene, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let view = &scene.game;
    let shake = scene.shake;

    let floor_row = row(area, GROUND_Y).min(area.bottom() as i32 - 1);
    let floor_style = Style::default().fg(Color::DarkGray);
    for x in area.x..area.right() {
        put(buf, area, x as i32, floor_row, "▀", floor_style);
    }

    let wall_style = Style::default().fg(Color::Gray);
    for wall in [&view.walls.left, &view.walls.right] {
        let rect = wall.rect(GROUND_Y);
        let x0 = col(area, rect.x + shake);
        let x1 = col(area, rect.right() + shake).max(x0 + 1);
        let y0 = row(area, rect.y);
        for y in y0..floor_row {
            for x in x0..x1 {
                put(buf, area, x, y, "█", wall_style);
            }
        }
    }

    render_player(scene, area, floor_row, buf);
    render_particles(scene.particles, area, shake, buf);
}

fn render_player(scene: &Scene, area: Rect, floor_row: i32, buf: &mut Buffer) {
    let player = scene.game.player;
    let style = Style::default()
        .fg(danger_color(player.danger))
        .add_modifier(Modifier::BOLD);

    let sprite = if scene.game.eyes_open {
        scene.sprite.clone()
    } else {
        scene.sprite.eyes_closed()
    };

    let rect = player.rect();
    let center = col(area, rect.x + rect.w / 2.0 + scene.shake);
    let left = center - sprite.width() as i32 / 2;
    let top = floor_row - sprite.height() as i32;
    for (dy, line) in sprite.lines.iter().enumerate() {
        for (dx, ch) in line.chars().enumerate() {
            if ch != ' ' {
                put(
                    buf,
                    area,
                    left + dx as i32,
                    top + dy as i32,
                    &ch.to_string(),
                    style,
                );
            }
        }
    }
}

fn render_particles(particles: &[Particle], area: Rect, shake: f64, buf: &mut Buffer) {
    let celebration = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::LightYellow,
    ];

    for (i, particle) in particles.iter().enumerate() {
        let color = match particle.kind {
            BurstKind::Dust => Color::DarkGray,
            BurstKind::Spark => Color::Red,
            BurstKind::Celebration => celebration[i % celebration.len()],
        };
        let life = particle.life();
        let style = if life > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if life > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };
        put(
            buf,
            area,
            col(area, particle.x + shake),
            row(area, particle.y),
            &particle.symbol.to_string(),
            style,
        );
    }
}

pub(crate) fn render_phrase(scene: &Scene, area: Rect, buf: &mut Buffer) {
    let view = &scene.game;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let (header, body) = match view.state {
        GameState::Memorizing => (
            Line::from(Span::styled(
                format!("Memorize!  {:.1}s", view.countdown.as_secs_f64()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(view.prompt.phrase().to_string(), bold_style)),
        ),
        _ => {
            let mut spans: Vec<Span> = view
                .prompt
                .outcomes()
                .into_iter()
                .map(|(c, outcome)| match outcome {
                    Outcome::Correct => Span::styled(c.to_string(), green_bold_style),
                    Outcome::Incorrect => Span::styled(
                        match c {
                            ' ' => "·".to_owned(),
                            c => c.to_string(),
                        },
                        red_bold_style,
                    ),
                })
                .collect();

            let typed = view.prompt.input.len();
            let mut rest = view.prompt.phrase().chars().skip(typed);
            if let Some(next) = rest.next() {
                spans.push(Span::styled(next.to_string(), underlined_dim_bold_style));
            }
            spans.push(Span::styled(rest.collect::<String>(), dim_bold_style));

            (
                Line::from(Span::styled(
                    "Close your eyes and type",
                    Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
                )),
                Line::from(spans),
            )
        }
    };

    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

/// Rows of the high score table, best first.
pub(crate) fn high_score_lines(table: &[ScoreRecord]) -> Vec<Line<'static>> {
    if table.is_empty() {
        return vec![Line::from(Span::styled(
            "no scores yet",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))];
    }
    table
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let when = r
                .achieved_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<12}", r.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:>7}", r.score), Style::default().fg(Color::Yellow)),
                Span::raw(format!("  {:>3} wpm {:>3}%  ", r.wpm, r.accuracy)),
                Span::styled(when, Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::{Game, InputEvent};
    use crate::levels::LevelProgression;
    use crate::phrases::{PhrasePool, Tier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::time::Duration;

    pub fn fixed_game(phrase: &str) -> Game {
        let sets: HashMap<Tier, Vec<String>> = Tier::ALL
            .iter()
            .map(|&t| (t, vec![phrase.to_string()]))
            .collect();
        Game::new(
            LevelProgression::default(),
            PhrasePool::with_phrases(sets, StdRng::seed_from_u64(1)),
        )
    }

    pub fn render_to_string(game: &Game, now: Duration, table: &[ScoreRecord]) -> String {
        let sprite = Sprite::placeholder();
        let scene = Scene {
            game: game.view(now),
            particles: &[],
            shake: 0.0,
            high_scores: table,
            sprite: &sprite,
            player_name: "Ana",
        };
        let area = Rect::new(0, 0, 100, 30);
        let mut buffer = Buffer::empty(area);
        (&scene).render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_danger_color_ramp() {
        assert_eq!(danger_color(0.0), Color::Rgb(255, 255, 255));
        assert_eq!(danger_color(0.5), Color::Rgb(255, 255, 0));
        assert_eq!(danger_color(1.0), Color::Rgb(255, 0, 0));
        assert_eq!(danger_color(7.0), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_memorizing_shows_phrase_and_countdown() {
        let mut game = fixed_game("Hola mundo");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        let rendered = render_to_string(&game, Duration::from_secs(1), &[]);
        assert!(rendered.contains("Hola mundo"));
        assert!(rendered.contains("Memorize!"));
        assert!(rendered.contains("4.0s"));
        assert!(rendered.contains("Level 1/5"));
    }

    #[test]
    fn test_playing_shows_typed_text_and_walls() {
        let mut game = fixed_game("Hola mundo");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        game.tick(Duration::from_secs(5), true);
        game.handle_input(InputEvent::Char('H'), Duration::from_secs(5));
        let rendered = render_to_string(&game, Duration::from_secs(5), &[]);
        assert!(rendered.contains("Close your eyes"));
        assert!(rendered.contains("Hola mundo"));
        assert!(rendered.contains('█'));
        assert!(rendered.contains("o.o"));
    }

    #[test]
    fn test_wrong_space_renders_as_dot() {
        let mut game = fixed_game("ab");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        game.tick(Duration::from_secs(5), true);
        game.handle_input(InputEvent::Char(' '), Duration::from_secs(5));
        let rendered = render_to_string(&game, Duration::from_secs(5), &[]);
        assert!(rendered.contains('·'));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let mut game = fixed_game("ab");
        game.handle_input(InputEvent::Confirm, Duration::ZERO);
        let sprite = Sprite::placeholder();
        let scene = Scene {
            game: game.view(Duration::ZERO),
            particles: &[],
            shake: 40.0,
            high_scores: &[],
            sprite: &sprite,
            player_name: "Ana",
        };
        let area = Rect::new(0, 0, 8, 3);
        let mut buffer = Buffer::empty(area);
        (&scene).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }
}
