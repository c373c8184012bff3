//! # Global scheduler configuration.
//!
//! Provides [`Config`] centralized settings for the scheduler runtime,
//! plus command-line parsing for the `taskwheel` binary.
//!
//! ## Command line
//! ```text
//! taskwheel [--shell PATH] [--quantum SECS] WORKER [WORKER ...]
//! ```
//! Every positional argument is an executable spawned as a worker task.
//! Requesting zero workers is a fatal configuration error, checked during
//! bootstrap rather than here so that library users building a [`Config`]
//! by hand get the same treatment.

use std::time::Duration;

use crate::error::SchedError;

/// Default time quantum between preemptions.
pub const DEFAULT_QUANTUM: Duration = Duration::from_secs(2);

/// Default path of the shell executable.
pub const DEFAULT_SHELL: &str = "./shell";

/// Global configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `quantum`: time slice after which the running task is preempted
/// - `shell_path`: executable spawned as the controlling shell
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Time slice granted to the running task before preemption.
    pub quantum: Duration,

    /// Path of the shell executable, spawned with the pipe fds as arguments.
    pub shell_path: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `quantum = 2s`
    /// - `shell_path = "./shell"`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            shell_path: DEFAULT_SHELL.to_string(),
            bus_capacity: 1024,
        }
    }
}

impl Config {
    /// Parses command-line arguments (without the program name).
    ///
    /// Returns the configuration and the list of worker executables.
    pub fn from_args<I>(args: I) -> Result<(Self, Vec<String>), SchedError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = Config::default();
        let mut workers = Vec::new();
        let mut it = args.into_iter();

        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--shell" => {
                    cfg.shell_path = it
                        .next()
                        .ok_or_else(|| SchedError::Usage("--shell requires a path".into()))?;
                }
                "--quantum" => {
                    let raw = it
                        .next()
                        .ok_or_else(|| SchedError::Usage("--quantum requires seconds".into()))?;
                    let secs: u64 = raw.parse().map_err(|_| {
                        SchedError::Usage(format!("invalid quantum {raw:?}, expected seconds"))
                    })?;
                    if secs == 0 {
                        return Err(SchedError::Usage("quantum must be at least 1s".into()));
                    }
                    cfg.quantum = Duration::from_secs(secs);
                }
                flag if flag.starts_with("--") => {
                    return Err(SchedError::Usage(format!("unknown flag {flag:?}")));
                }
                _ => workers.push(arg),
            }
        }

        Ok((cfg, workers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<(Config, Vec<String>), SchedError> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.quantum, Duration::from_secs(2));
        assert_eq!(cfg.shell_path, "./shell");
    }

    #[test]
    fn test_positional_args_are_workers() {
        let (_, workers) = parse(&["./a", "./b", "./c"]).unwrap();
        assert_eq!(workers, vec!["./a", "./b", "./c"]);
    }

    #[test]
    fn test_flags_override_defaults() {
        let (cfg, workers) = parse(&["--shell", "/opt/shell", "--quantum", "5", "./w"]).unwrap();
        assert_eq!(cfg.shell_path, "/opt/shell");
        assert_eq!(cfg.quantum, Duration::from_secs(5));
        assert_eq!(workers, vec!["./w"]);
    }

    #[test]
    fn test_zero_quantum_rejected() {
        assert!(matches!(
            parse(&["--quantum", "0", "./w"]),
            Err(SchedError::Usage(_))
        ));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(matches!(parse(&["--bogus"]), Err(SchedError::Usage(_))));
    }

    #[test]
    fn test_missing_flag_value_rejected() {
        assert!(matches!(parse(&["--shell"]), Err(SchedError::Usage(_))));
    }
}
