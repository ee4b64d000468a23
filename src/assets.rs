use std::fs;
use std::path::Path;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::error::{NomiresError, Result};

/// Text-art player sprite, drawn top to bottom inside the player's box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub lines: Vec<String>,
}

impl Sprite {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Built-in cat face, used when no sprite file is configured or it
    /// can't be read.
    pub fn placeholder() -> Self {
        Self::new(
            [r" /\_/\ ", r"( o.o )", r" > ^ < "]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// The same face with its eyes shut.
    pub fn eyes_closed(&self) -> Self {
        Self::new(self.lines.iter().map(|l| l.replace('o', "-")).collect())
    }

    pub fn width(&self) -> usize {
        self.lines.iter().map(|l| l.width()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::placeholder()
    }
}

pub fn load_sprite(path: &Path) -> Result<Sprite> {
    let text = fs::read_to_string(path).map_err(|e| NomiresError::Asset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    let lines: Vec<String> = match lines.iter().rposition(|l| !l.is_empty()) {
        Some(last) => lines[..=last].to_vec(),
        None => {
            return Err(NomiresError::Asset {
                path: path.to_path_buf(),
                reason: "sprite file is empty".into(),
            })
        }
    };
    Ok(Sprite::new(lines))
}

/// Missing or broken sprite files fall back to the placeholder.
pub fn load_sprite_or_placeholder(path: Option<&Path>) -> Sprite {
    let Some(path) = path else {
        return Sprite::placeholder();
    };
    match load_sprite(path) {
        Ok(sprite) => sprite,
        Err(e) => {
            warn!(error = %e, "using placeholder sprite");
            Sprite::placeholder()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn loads_sprite_and_trims_trailing_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cat.txt");
        fs::write(&path, "  ^^  \n (oo)\n\n\n").unwrap();
        let sprite = load_sprite(&path).unwrap();
        assert_eq!(sprite.lines, vec!["  ^^", " (oo)"]);
        assert_eq!(sprite.height(), 2);
        assert_eq!(sprite.width(), 5);
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let dir = tempdir().unwrap();
        let err = load_sprite(&dir.path().join("nope.txt")).unwrap_err();
        assert_matches!(err, NomiresError::Asset { .. });
    }

    #[test]
    fn empty_file_is_an_asset_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "\n  \n").unwrap();
        assert_matches!(load_sprite(&path), Err(NomiresError::Asset { .. }));
    }

    #[test]
    fn fallback_to_placeholder() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert_eq!(
            load_sprite_or_placeholder(Some(&missing)),
            Sprite::placeholder()
        );
        assert_eq!(load_sprite_or_placeholder(None), Sprite::placeholder());
    }

    #[test]
    fn closed_eyes_variant() {
        let closed = Sprite::placeholder().eyes_closed();
        assert_eq!(closed.lines[1], "( -.- )");
    }
}
