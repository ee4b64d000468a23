use std::io::{self, Write};

use crate::game::SoundCue;

/// Plays game sound cues.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Rings the terminal bell on a miss, a completed phrase and a crash.
/// Plain keystrokes stay silent.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn rings_for(cue: SoundCue) -> bool {
        matches!(
            cue,
            SoundCue::Miss | SoundCue::PhraseComplete | SoundCue::Crash
        )
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, cue: SoundCue) {
        if Self::rings_for(cue) {
            let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
        }
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Keeps every cue it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}
