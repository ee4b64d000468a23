use crate::constants::{WALL_HEIGHT, WALL_START_LEFT, WALL_START_RIGHT, WALL_WIDTH};
use crate::player::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Direction a wall on this side travels toward the center.
    fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub side: Side,
    /// Offset of the wall's left edge from the left of the playfield.
    pub x: f64,
    pub width: f64,
    pub height: f64,
    initial_x: f64,
}

impl Wall {
    pub fn new(side: Side, x: f64) -> Self {
        Self {
            side,
            x,
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            initial_x: x,
        }
    }

    /// Edge facing the player.
    pub fn inner_edge(&self) -> f64 {
        match self.side {
            Side::Left => self.x + self.width,
            Side::Right => self.x,
        }
    }

    /// Walls are anchored to the floor and span upward.
    pub fn rect(&self, floor_y: f64) -> Rect {
        Rect::new(self.x, floor_y - self.height, self.width, self.height)
    }

    fn advance(&mut self, speed: f64) {
        self.x += self.side.sign() * speed;
    }

    fn reset(&mut self) {
        self.x = self.initial_x;
    }
}

/// The pair of closing walls. Movement is a fixed increment per tick, so
/// wall speed is tied to the tick rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Walls {
    pub left: Wall,
    pub right: Wall,
    speed: f64,
    enabled: bool,
}

impl Walls {
    pub fn new() -> Self {
        Self::with_offsets(WALL_START_LEFT, WALL_START_RIGHT)
    }

    pub fn with_offsets(left: f64, right: f64) -> Self {
        Self {
            left: Wall::new(Side::Left, left),
            right: Wall::new(Side::Right, right),
            speed: 0.0,
            enabled: false,
        }
    }

    /// Magnitude shared by both walls; the sign comes from each wall's side.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.abs();
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Advance both walls by one step. Returns whether anything moved.
    pub fn tick(&mut self) -> bool {
        if !self.enabled || self.speed == 0.0 {
            return false;
        }
        self.left.advance(self.speed);
        self.right.advance(self.speed);
        true
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.enabled = false;
        self.speed = 0.0;
    }

    /// Open space between the two inner edges.
    pub fn gap(&self) -> f64 {
        self.right.inner_edge() - self.left.inner_edge()
    }
}

impl Default for Walls {
    fn default() -> Self {
        Self::new()
    }
}
