use crate::constants::{GROUND_Y, PLAYER_SIZE, PLAYER_START_X, PLAYER_START_Y, SAFE_DISTANCE};
use crate::walls::Walls;

/// Axis-aligned box. Intervals are half-open, `[x, x + w)`, so two boxes
/// sharing an edge touch without overlapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub danger: f64,
    pub alive: bool,
    safe_distance: f64,
}

impl Player {
    pub fn new() -> Self {
        Self {
            x: PLAYER_START_X,
            y: PLAYER_START_Y,
            size: PLAYER_SIZE,
            danger: 0.0,
            alive: true,
            safe_distance: SAFE_DISTANCE,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Push the player out of either wall. When the gap is narrower than the
    /// player, it ends up flush against the left wall and overlapping the
    /// right one, which the collision check then reports.
    pub fn clamp_to(&mut self, walls: &Walls) {
        let min_x = walls.left.inner_edge();
        let max_x = walls.right.inner_edge() - self.size;
        if self.x > max_x {
            self.x = max_x;
        }
        if self.x < min_x {
            self.x = min_x;
        }
    }

    /// Distance from the player's sides to the nearest wall edge.
    pub fn min_distance(&self, walls: &Walls) -> f64 {
        let rect = self.rect();
        let to_left = rect.x - walls.left.inner_edge();
        let to_right = walls.right.inner_edge() - rect.right();
        to_left.min(to_right)
    }

    pub fn update_danger(&mut self, walls: &Walls) -> f64 {
        self.clamp_to(walls);
        self.danger = danger_level(self.min_distance(walls), self.safe_distance);
        self.danger
    }

    /// A wall overlapping the player is a hit, and so is a gap too narrow
    /// for it. The second case covers walls fast enough to pass each other
    /// within one tick.
    pub fn check_collision(&mut self, walls: &Walls) -> bool {
        let rect = self.rect();
        let hit = walls.gap() < self.size
            || rect.overlaps(&walls.left.rect(GROUND_Y))
            || rect.overlaps(&walls.right.rect(GROUND_Y));
        if hit {
            self.alive = false;
        }
        hit
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

pub fn danger_level(min_dist: f64, safe_distance: f64) -> f64 {
    if min_dist <= 0.0 {
        return 1.0;
    }
    (1.0 - min_dist / safe_distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walls_at(left_x: f64, right_x: f64) -> Walls {
        Walls::with_offsets(left_x, right_x)
    }

    #[test]
    fn test_player_starts_centered_on_floor() {
        let player = Player::new();
        assert_eq!(player.x, 600.0);
        assert_eq!(player.rect().bottom(), GROUND_Y);
        assert!(player.alive);
    }

    #[test]
    fn test_touching_is_not_colliding() {
        let mut player = Player::new();
        // right wall's left edge exactly at the player's right edge
        let walls = walls_at(0.0, player.rect().right());
        assert!(!player.check_collision(&walls));
        assert!(player.alive);

        // left wall's right edge exactly at the player's left edge
        let mut player = Player::new();
        let walls = walls_at(player.x - 30.0, 1250.0);
        assert!(!player.check_collision(&walls));
        assert!(player.alive);
    }

    #[test]
    fn test_any_overlap_collides() {
        let mut player = Player::new();
        let walls = walls_at(0.0, player.rect().right() - 0.01);
        assert!(player.check_collision(&walls));
        assert!(!player.alive);

        let mut player = Player::new();
        let walls = walls_at(player.x - 29.99, 1250.0);
        assert!(player.check_collision(&walls));
    }

    #[test]
    fn test_clamp_pushes_out_without_collision() {
        let mut player = Player::new();
        // left wall has advanced 10 units into the player's box
        let walls = walls_at(player.x - 20.0, 1250.0);
        player.clamp_to(&walls);
        assert_eq!(player.x, walls.left.inner_edge());
        assert!(!player.check_collision(&walls));
    }

    #[test]
    fn test_squeeze_collides_after_clamp() {
        let mut player = Player::new();
        // 60 units of gap for an 80 unit player
        let walls = walls_at(570.0, 660.0);
        player.update_danger(&walls);
        assert_eq!(player.x, 600.0);
        assert_eq!(player.danger, 1.0);
        assert!(player.check_collision(&walls));
    }

    #[test]
    fn test_crossed_walls_collide() {
        let mut player = Player::new();
        // walls have passed each other: left inner edge well right of the right one
        let walls = walls_at(1000.0, 200.0);
        player.update_danger(&walls);
        assert!(player.check_collision(&walls));
        assert!(!player.alive);
    }

    #[test]
    fn test_danger_boundaries() {
        assert_eq!(danger_level(SAFE_DISTANCE, SAFE_DISTANCE), 0.0);
        assert_eq!(danger_level(SAFE_DISTANCE * 2.0, SAFE_DISTANCE), 0.0);
        assert_eq!(danger_level(0.0, SAFE_DISTANCE), 1.0);
        assert_eq!(danger_level(-5.0, SAFE_DISTANCE), 1.0);
        assert!((danger_level(SAFE_DISTANCE / 2.0, SAFE_DISTANCE) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_danger_non_increasing_with_distance() {
        let mut last = f64::INFINITY;
        let mut d = -10.0;
        while d < SAFE_DISTANCE * 1.5 {
            let danger = danger_level(d, SAFE_DISTANCE);
            assert!(danger <= last);
            assert!((0.0..=1.0).contains(&danger));
            last = danger;
            d += 7.5;
        }
    }

    #[test]
    fn test_update_danger_at_start_is_zero() {
        let mut player = Player::new();
        let walls = Walls::new();
        // 570 units to each wall, well past the 320 safe distance
        assert_eq!(player.update_danger(&walls), 0.0);
    }

    #[test]
    fn test_reset_restores_alive() {
        let mut player = Player::new();
        player.alive = false;
        player.x = 10.0;
        player.danger = 0.8;
        player.reset();
        assert_eq!(player, Player::new());
    }
}
