//! Optional transcript logging to a plain-text file.
//!
//! Enabled by the `/log <file>` command or the `--log` flag; `/log` without
//! an argument toggles pause/resume. Messages are appended as they land in
//! the transcript.

use std::fs::OpenOptions;
use std::io::Write;

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Self {
        // A file given at startup enables logging immediately.
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn log_message(&self, speaker: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active || self.file_path.is_none() {
            return Ok(());
        }

        let file_path = self.file_path.as_ref().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        writeln!(file, "{speaker}:")?;
        for line in content.lines() {
            writeln!(file, "{line}")?;
        }
        // Empty line after each message for spacing, matching screen display.
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Cannot write to log file '{path}': {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn starts_active_only_with_a_startup_file() {
        assert!(!LoggingState::new(None).is_active());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log").display().to_string();
        assert!(LoggingState::new(Some(path)).is_active());
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut logging = LoggingState::new(None);
        assert!(logging.toggle_logging().is_err());
    }

    #[test]
    fn messages_append_with_speaker_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log").display().to_string();

        let mut logging = LoggingState::new(None);
        logging.set_log_file(path.clone()).unwrap();
        logging.log_message("You", "hello").unwrap();
        logging.log_message("Zara", "greetings!").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You:\nhello\n"));
        assert!(contents.contains("Zara:\ngreetings!\n"));
    }

    #[test]
    fn paused_logging_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log").display().to_string();

        let mut logging = LoggingState::new(Some(path.clone()));
        logging.toggle_logging().unwrap();
        logging.log_message("You", "hidden").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(!contents.contains("hidden"));
    }
}
