use std::io::{self, Read};

use super::NoteInput;

/// Note terms piped in on stdin.
/// Returns None for an interactive terminal or an empty pipe.
pub fn read_note_stdin() -> Result<Option<NoteInput>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NoteInput::from_json(trimmed, "stdin").map(Some)
}
