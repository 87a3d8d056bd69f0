//! Connectivity sources for the monitor.

use std::process::Command;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One connectivity sample.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionSignal {
    pub connected: bool,
    pub ssid: Option<String>,
}

impl ConnectionSignal {
    pub fn connected(ssid: impl Into<String>) -> Self {
        Self {
            connected: true,
            ssid: Some(ssid.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// Anything that can report whether we are on a network right now.
pub trait ConnectionProbe {
    fn sample(&mut self) -> ConnectionSignal;
}

/// Runs a command that prints the current SSID (e.g. `iwgetid -r`).
///
/// Empty output, a non-zero exit, or a missing program all read as
/// disconnected.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
}

impl CommandProbe {
    /// Split a command line on whitespace. Returns `None` for an empty line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl ConnectionProbe for CommandProbe {
    fn sample(&mut self) -> ConnectionSignal {
        let output = match Command::new(&self.program).args(&self.args).output() {
            Ok(output) => output,
            Err(e) => {
                debug!(program = %self.program, error = %e, "probe command failed");
                return ConnectionSignal::disconnected();
            }
        };
        if !output.status.success() {
            return ConnectionSignal::disconnected();
        }
        let ssid = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if ssid.is_empty() {
            ConnectionSignal::disconnected()
        } else {
            ConnectionSignal::connected(ssid)
        }
    }
}

/// Chance per sample that the mock flips its connection state.
pub const MOCK_TOGGLE_PROBABILITY: f64 = 0.3;

/// Simulated network for development: each sample toggles the connection
/// with probability [`MOCK_TOGGLE_PROBABILITY`], reporting `ssid` when up.
#[derive(Debug, Clone)]
pub struct MockProbe {
    ssid: String,
    connected: bool,
    rng: StdRng,
}

impl MockProbe {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self::with_rng(ssid, StdRng::from_entropy())
    }

    pub fn seeded(ssid: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(ssid, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ssid: impl Into<String>, rng: StdRng) -> Self {
        Self {
            ssid: ssid.into(),
            connected: false,
            rng,
        }
    }
}

impl ConnectionProbe for MockProbe {
    fn sample(&mut self) -> ConnectionSignal {
        if self.rng.gen_bool(MOCK_TOGGLE_PROBABILITY) {
            self.connected = !self.connected;
            debug!(connected = self.connected, "mock network toggled");
        }
        if self.connected {
            ConnectionSignal::connected(self.ssid.clone())
        } else {
            ConnectionSignal::disconnected()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_parsing() {
        let probe = CommandProbe::from_command_line("iwgetid -r").unwrap();
        assert_eq!(probe.program, "iwgetid");
        assert_eq!(probe.args, vec!["-r"]);
        assert!(CommandProbe::from_command_line("   ").is_none());
    }

    #[test]
    fn missing_program_reads_as_disconnected() {
        let mut probe = CommandProbe::from_command_line("hearth-no-such-probe-binary").unwrap();
        assert_eq!(probe.sample(), ConnectionSignal::disconnected());
    }

    #[test]
    fn mock_toggles_and_reports_ssid() {
        let mut probe = MockProbe::seeded("HomeNet", 7);
        let samples: Vec<_> = (0..200).map(|_| probe.sample()).collect();
        assert!(samples.iter().any(|s| s.connected));
        assert!(samples.iter().any(|s| !s.connected));
        assert!(samples
            .iter()
            .filter(|s| s.connected)
            .all(|s| s.ssid.as_deref() == Some("HomeNet")));
    }
}
