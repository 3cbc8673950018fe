//! Transcript logging.
//!
//! When enabled, every rendered message is appended to a plain-text file:
//! user lines carry a `You:` prefix, everything else is written as-is, with a
//! blank line between entries to match the on-screen spacing.

use std::fs::OpenOptions;
use std::io::Write;

use crate::core::message::Message;

pub struct TranscriptLog {
    file_path: Option<String>,
}

impl TranscriptLog {
    /// Creates the log state. When a path is given, write access is verified
    /// up front so a bad path fails at startup rather than mid-session.
    pub fn new(file_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &file_path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.flush()?;
        }
        Ok(Self { file_path })
    }

    pub fn log_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        if message.is_user() {
            for line in format!("You: {}", message.content).lines() {
                writeln!(file, "{line}")?;
            }
        } else {
            for line in message.content.lines() {
                writeln!(file, "{line}")?;
            }
        }
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn disabled_log_is_a_noop() {
        let log = TranscriptLog::new(None).unwrap();
        log.log_message(&Message::user("hello")).unwrap();
    }

    #[test]
    fn writes_prefixed_user_and_plain_assistant_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.log");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned())).unwrap();

        log.log_message(&Message::user("list the pods")).unwrap();
        log.log_message(&Message::assistant("pod-a\npod-b")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: list the pods\n\npod-a\npod-b\n\n");
    }
}
