use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Debris kicked up by an advancing wall.
    Dust,
    /// Wrong keystroke.
    Spark,
    /// Phrase completed.
    Celebration,
}

/// Single particle in playfield coordinates.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub kind: BurstKind,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn new(x: f64, y: f64, kind: BurstKind) -> Self {
        let mut rng = rand::thread_rng();
        let (vel_x, vel_y, symbols, max_age): (f64, f64, &[char], f64) = match kind {
            BurstKind::Dust => (
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-60.0..-10.0),
                &['.', ',', '\''][..],
                rng.gen_range(0.3..0.7),
            ),
            BurstKind::Spark => (
                rng.gen_range(-120.0..120.0),
                rng.gen_range(-120.0..120.0),
                &['*', '+', 'x'][..],
                rng.gen_range(0.2..0.5),
            ),
            BurstKind::Celebration => (
                rng.gen_range(-250.0..250.0),
                rng.gen_range(-400.0..-100.0),
                &['*', '+', 'o', '✦', '✧'][..],
                rng.gen_range(1.0..2.0),
            ),
        };

        Self {
            x,
            y,
            vel_x,
            vel_y,
            symbol: *symbols.choose(&mut rng).unwrap_or(&'*'),
            kind,
            age: 0.0,
            max_age,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        if self.kind != BurstKind::Spark {
            self.vel_y += 400.0 * dt;
        }
        self.age += dt;
        self.age < self.max_age
    }

    /// Remaining life in `[0, 1]`, used for fading.
    pub fn life(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, x: f64, y: f64, kind: BurstKind, count: usize) {
        self.particles
            .extend((0..count).map(|_| Particle::new(x, y, kind)));
    }

    pub fn update(&mut self, dt: f64) {
        let buffer = 50.0;
        self.particles.retain_mut(|particle| {
            let still_alive = particle.update(dt);
            let off_screen = particle.y > PLAYFIELD_HEIGHT + buffer
                || particle.x < -buffer
                || particle.x > PLAYFIELD_WIDTH + buffer;
            still_alive && !off_screen
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Horizontal jitter applied to the whole playfield for a few ticks.
#[derive(Debug, Default, Clone)]
pub struct ScreenShake {
    remaining: u32,
    intensity: f64,
}

impl ScreenShake {
    pub const DURATION_TICKS: u32 = 10;
    pub const INTENSITY: f64 = 8.0;

    pub fn start(&mut self) {
        self.remaining = Self::DURATION_TICKS;
        self.intensity = Self::INTENSITY;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Offset for this tick; decays to zero as the shake runs out.
    pub fn next_offset(&mut self) -> f64 {
        if self.remaining == 0 {
            return 0.0;
        }
        let scale = self.remaining as f64 / Self::DURATION_TICKS as f64;
        self.remaining -= 1;
        rand::thread_rng().gen_range(-1.0..=1.0) * self.intensity * scale
    }
}
