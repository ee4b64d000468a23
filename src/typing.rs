#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Characters typed so far. Only grows at the end and shrinks from the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserInput {
    chars: Vec<char>,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_char(&mut self, c: char) {
        self.chars.push(c);
    }

    /// Removing from an empty input is a no-op.
    pub fn remove_last(&mut self) -> Option<char> {
        self.chars.pop()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

/// The active phrase and what the player has typed against it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prompt {
    phrase: Vec<char>,
    text: String,
    pub input: UserInput,
}

impl Prompt {
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.chars().collect(),
            text: phrase.to_string(),
            input: UserInput::new(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.text
    }

    /// Character the next keystroke should produce, if the phrase isn't
    /// already fully typed.
    pub fn expected_char(&self) -> Option<char> {
        self.phrase.get(self.input.len()).copied()
    }

    /// Classify `c` against the next expected character, then append it.
    pub fn write(&mut self, c: char) -> Outcome {
        let outcome = if self.expected_char() == Some(c) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.input.append_char(c);
        outcome
    }

    pub fn backspace(&mut self) {
        self.input.remove_last();
    }

    /// Exact equality, length included.
    pub fn matches(&self) -> bool {
        self.input.chars() == self.phrase.as_slice()
    }

    /// Per-position outcome of everything typed so far.
    pub fn outcomes(&self) -> Vec<(char, Outcome)> {
        self.input
            .chars()
            .iter()
            .enumerate()
            .map(|(idx, &c)| {
                let outcome = if self.phrase.get(idx) == Some(&c) {
                    Outcome::Correct
                } else {
                    Outcome::Incorrect
                };
                (c, outcome)
            })
            .collect()
    }

    /// Positional accuracy as a floored percentage, 100 when nothing is typed.
    pub fn accuracy(&self) -> u32 {
        let typed = self.input.len();
        if typed == 0 {
            return 100;
        }
        let correct = self
            .outcomes()
            .iter()
            .filter(|(_, o)| *o == Outcome::Correct)
            .count();
        (correct * 100 / typed) as u32
    }
}
