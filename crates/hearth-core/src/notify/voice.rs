//! Text-to-speech through an external program.

use std::process::{Command, Stdio};

use tracing::debug;

use super::Speaker;
use crate::error::NotifyError;

/// Runs `command [args..] <text>` in the background.
///
/// The configured command line is split on whitespace, so `"espeak -s 140"`
/// passes `-s 140` before the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// `None` when the command line is blank.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<(), NotifyError> {
        let mut child = self
            .command(text)
            .spawn()
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(program = %self.program, pid = child.id(), "speaking announcement");
        // Reaped off-thread; callers never wait on speech.
        std::thread::spawn(move || child.wait());
        Ok(())
    }
}
