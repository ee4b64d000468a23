use include_dir::{include_dir, Dir};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::typing::Prompt;

static PHRASE_DIR: Dir = include_dir!("src/phrases");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];
}

#[derive(Deserialize, Clone, Debug)]
pub struct PhraseSet {
    pub tier: Tier,
    pub phrases: Vec<String>,
}

/// Load the phrase set bundled for `tier`.
pub fn builtin_set(tier: Tier) -> PhraseSet {
    let file_name = format!("{tier}.json");
    let set = PHRASE_DIR
        .get_file(&file_name)
        .and_then(|f| f.contents_utf8())
        .and_then(|s| serde_json::from_str::<PhraseSet>(s).ok());

    match set {
        Some(set) => set,
        // bundled at compile time; only reachable if the json is broken
        None => PhraseSet {
            tier,
            phrases: vec!["Hola mundo".to_string()],
        },
    }
}

/// Per-tier sampling without replacement. A tier's pool is refilled from
/// its full set only once it has been drained.
#[derive(Debug)]
pub struct PhrasePool {
    sets: HashMap<Tier, Vec<String>>,
    remaining: HashMap<Tier, Vec<String>>,
    rng: StdRng,
    current: Prompt,
}

impl PhrasePool {
    pub fn new() -> Self {
        let sets = Tier::ALL
            .iter()
            .map(|&tier| (tier, builtin_set(tier).phrases))
            .collect();
        Self::with_phrases(sets, StdRng::from_entropy())
    }

    pub fn with_phrases(sets: HashMap<Tier, Vec<String>>, rng: StdRng) -> Self {
        Self {
            remaining: sets.clone(),
            sets,
            rng,
            current: Prompt::default(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        let mut pool = Self::new();
        pool.rng = StdRng::seed_from_u64(seed);
        pool
    }

    /// Draw the next phrase for `tier` and make it the active prompt with
    /// empty input.
    pub fn select(&mut self, tier: Tier) -> &str {
        let full = self.sets.get(&tier).cloned().unwrap_or_default();
        let remaining = self.remaining.entry(tier).or_default();
        if remaining.is_empty() {
            debug!(%tier, size = full.len(), "phrase pool exhausted, refilling");
            *remaining = full;
        }

        let phrase = if remaining.is_empty() {
            String::new()
        } else {
            let idx = self.rng.gen_range(0..remaining.len());
            remaining.swap_remove(idx)
        };

        self.current = Prompt::new(&phrase);
        self.current.phrase()
    }

    pub fn remaining(&self, tier: Tier) -> usize {
        self.remaining.get(&tier).map_or(0, Vec::len)
    }

    pub fn prompt(&self) -> &Prompt {
        &self.current
    }

    pub fn prompt_mut(&mut self) -> &mut Prompt {
        &mut self.current
    }

    pub fn append_char(&mut self, c: char) {
        self.current.input.append_char(c);
    }

    pub fn remove_last(&mut self) {
        self.current.input.remove_last();
    }

    pub fn matches(&self) -> bool {
        self.current.matches()
    }

    pub fn accuracy(&self) -> u32 {
        self.current.accuracy()
    }
}

impl Default for PhrasePool {
    fn default() -> Self {
        Self::new()
    }
}
