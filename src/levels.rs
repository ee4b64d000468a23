use std::time::Duration;

use crate::phrases::Tier;

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub number: u32,
    /// Baseline wall speed in playfield units per tick.
    pub wall_speed: f64,
    /// Time allowed to memorize the phrase.
    pub tolerance_time: Duration,
    pub phrase_difficulty: Tier,
}

impl Level {
    pub fn new(number: u32, wall_speed: f64, tolerance_secs: f64, tier: Tier) -> Self {
        Self {
            number,
            wall_speed,
            tolerance_time: Duration::from_secs_f64(tolerance_secs),
            phrase_difficulty: tier,
        }
    }
}

pub fn default_campaign() -> Vec<Level> {
    vec![
        Level::new(1, 1.5, 5.0, Tier::Easy),
        Level::new(2, 2.0, 4.0, Tier::Medium),
        Level::new(3, 2.5, 3.5, Tier::Medium),
        Level::new(4, 3.0, 3.0, Tier::Hard),
        Level::new(5, 3.5, 2.5, Tier::Hard),
    ]
}

/// Ordered campaign with a cursor that only moves forward until reset.
#[derive(Debug, Clone)]
pub struct LevelProgression {
    levels: Vec<Level>,
    index: usize,
}

impl LevelProgression {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels, index: 0 }
    }

    pub fn current(&self) -> Option<&Level> {
        self.levels.get(self.index)
    }

    pub fn number(&self) -> u32 {
        self.index as u32 + 1
    }

    pub fn total(&self) -> usize {
        self.levels.len()
    }

    pub fn is_final(&self) -> bool {
        self.index + 1 >= self.levels.len()
    }

    /// Move to the next level. Returns false when the campaign is over; the
    /// cursor stays on the last level in that case.
    pub fn advance(&mut self) -> bool {
        if self.is_final() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::new(default_campaign())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_campaign_shape() {
        let levels = default_campaign();
        assert_eq!(levels.len(), 5);
        for (i, level) in levels.iter().enumerate() {
            assert_eq!(level.number, i as u32 + 1);
        }
        // speeds rise, memorize time shrinks
        assert!(levels.windows(2).all(|w| w[0].wall_speed < w[1].wall_speed));
        assert!(levels
            .windows(2)
            .all(|w| w[0].tolerance_time >= w[1].tolerance_time));
        assert_eq!(levels[0].phrase_difficulty, Tier::Easy);
        assert_eq!(levels[4].phrase_difficulty, Tier::Hard);
    }

    #[test]
    fn test_advance_through_campaign() {
        let mut progression = LevelProgression::default();
        assert_eq!(progression.number(), 1);
        for expected in 2..=5 {
            assert!(progression.advance());
            assert_eq!(progression.number(), expected);
        }
        assert!(progression.is_final());
        assert!(!progression.advance());
        assert_eq!(progression.number(), 5);
        assert!(progression.current().is_some());
    }

    #[test]
    fn test_reset() {
        let mut progression = LevelProgression::default();
        progression.advance();
        progression.advance();
        progression.reset();
        assert_eq!(progression.number(), 1);
        assert_eq!(progression.current().map(|l| l.wall_speed), Some(1.5));
    }

    #[test]
    fn test_empty_campaign() {
        let mut progression = LevelProgression::new(vec![]);
        assert!(progression.current().is_none());
        assert!(progression.is_final());
        assert!(!progression.advance());
    }
}
