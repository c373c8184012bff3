//! # Fixed-size request/response frames.
//!
//! Frames are sent whole over the pipe pair; a partial frame is a protocol
//! failure, handled by the channel, not here.
//!
//! ## Request layout (68 bytes)
//! ```text
//! offset  size  field
//!      0     4  command tag, i32 LE (0 = list, 1 = kill, 2 = exec)
//!      4     4  task id argument, i32 LE (kill only)
//!      8    60  exec path, NUL-padded bytes (exec only)
//! ```
//!
//! ## Response layout (4 bytes)
//! A single i32 LE status: `0` for success, negative for errors.

use thiserror::Error;

/// Maximum exec path length carried in a request.
pub const EXEC_ARG_SZ: usize = 60;

/// Size of an encoded request frame.
pub const REQUEST_SIZE: usize = 8 + EXEC_ARG_SZ;

/// Size of an encoded response frame.
pub const RESPONSE_SIZE: usize = 4;

/// Command succeeded.
pub const STATUS_OK: i32 = 0;
/// Unknown command tag or malformed argument (mirrors -ENOSYS).
pub const STATUS_BAD_COMMAND: i32 = -38;
/// `kill-task` named an id no longer in the registry (mirrors -ESRCH).
pub const STATUS_NO_SUCH_TASK: i32 = -3;
/// `exec-task` could not spawn the executable (mirrors -EAGAIN).
pub const STATUS_SPAWN_FAILED: i32 = -11;

const TAG_LIST: i32 = 0;
const TAG_KILL: i32 = 1;
const TAG_EXEC: i32 = 2;

/// Decoded shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Dump the task table to the scheduler's diagnostic output.
    ListTasks,
    /// Kill the task with the given scheduler id.
    KillTask(u32),
    /// Spawn a new suspended task from the given executable path.
    ExecTask(String),
}

impl Request {
    /// Short command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::ListTasks => "list-tasks",
            Request::KillTask(_) => "kill-task",
            Request::ExecTask(_) => "exec-task",
        }
    }
}

/// Frame decode/encode failures.
///
/// Decode failures are answered with [`STATUS_BAD_COMMAND`]; they do not
/// tear the channel down.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WireError {
    /// The command tag is not part of the protocol.
    #[error("unknown command tag {0}")]
    UnknownCommand(i32),

    /// The kill argument does not name a valid id.
    #[error("invalid task id argument {0}")]
    BadTaskId(i32),

    /// The exec path is empty or not valid UTF-8.
    #[error("exec path is empty or not valid utf-8")]
    BadPath,

    /// The exec path does not fit in the fixed-size frame.
    #[error("exec path longer than {EXEC_ARG_SZ} bytes")]
    PathTooLong,
}

/// Decodes one request frame.
pub fn decode_request(buf: &[u8; REQUEST_SIZE]) -> Result<Request, WireError> {
    let tag = i32::from_le_bytes(buf[0..4].try_into().expect("fixed slice"));
    match tag {
        TAG_LIST => Ok(Request::ListTasks),
        TAG_KILL => {
            let raw = i32::from_le_bytes(buf[4..8].try_into().expect("fixed slice"));
            u32::try_from(raw)
                .map(Request::KillTask)
                .map_err(|_| WireError::BadTaskId(raw))
        }
        TAG_EXEC => {
            let bytes = &buf[8..];
            let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            let path = std::str::from_utf8(&bytes[..len]).map_err(|_| WireError::BadPath)?;
            if path.is_empty() {
                return Err(WireError::BadPath);
            }
            Ok(Request::ExecTask(path.to_string()))
        }
        other => Err(WireError::UnknownCommand(other)),
    }
}

/// Encodes one request frame.
///
/// Used by tests and by Rust shell implementations.
pub fn encode_request(req: &Request) -> Result<[u8; REQUEST_SIZE], WireError> {
    let mut buf = [0u8; REQUEST_SIZE];
    match req {
        Request::ListTasks => {
            buf[0..4].copy_from_slice(&TAG_LIST.to_le_bytes());
        }
        Request::KillTask(id) => {
            buf[0..4].copy_from_slice(&TAG_KILL.to_le_bytes());
            let raw = i32::try_from(*id).map_err(|_| WireError::BadTaskId(i32::MAX))?;
            buf[4..8].copy_from_slice(&raw.to_le_bytes());
        }
        Request::ExecTask(path) => {
            buf[0..4].copy_from_slice(&TAG_EXEC.to_le_bytes());
            let bytes = path.as_bytes();
            if bytes.is_empty() {
                return Err(WireError::BadPath);
            }
            if bytes.len() > EXEC_ARG_SZ {
                return Err(WireError::PathTooLong);
            }
            buf[8..8 + bytes.len()].copy_from_slice(bytes);
        }
    }
    Ok(buf)
}

/// Encodes a response status.
pub fn encode_status(status: i32) -> [u8; RESPONSE_SIZE] {
    status.to_le_bytes()
}

/// Decodes a response status.
pub fn decode_status(buf: &[u8; RESPONSE_SIZE]) -> i32 {
    i32::from_le_bytes(*buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_sizes() {
        assert_eq!(REQUEST_SIZE, 68);
        assert_eq!(RESPONSE_SIZE, 4);
        let frame = encode_request(&Request::ExecTask("/bin/true".into())).unwrap();
        assert_eq!(frame.len(), REQUEST_SIZE);
    }

    #[test]
    fn test_list_roundtrip() {
        let frame = encode_request(&Request::ListTasks).unwrap();
        assert_eq!(decode_request(&frame), Ok(Request::ListTasks));
    }

    #[test]
    fn test_kill_roundtrip() {
        let frame = encode_request(&Request::KillTask(7)).unwrap();
        assert_eq!(decode_request(&frame), Ok(Request::KillTask(7)));
    }

    #[test]
    fn test_exec_roundtrip_nul_padded() {
        let frame = encode_request(&Request::ExecTask("/bin/true".into())).unwrap();
        // Padding after the path must be NUL bytes.
        assert!(frame[8 + "/bin/true".len()..].iter().all(|&b| b == 0));
        assert_eq!(
            decode_request(&frame),
            Ok(Request::ExecTask("/bin/true".into()))
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[0..4].copy_from_slice(&99i32.to_le_bytes());
        assert_eq!(decode_request(&buf), Err(WireError::UnknownCommand(99)));
    }

    #[test]
    fn test_negative_kill_id_rejected() {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[0..4].copy_from_slice(&TAG_KILL.to_le_bytes());
        buf[4..8].copy_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(decode_request(&buf), Err(WireError::BadTaskId(-5)));
    }

    #[test]
    fn test_empty_exec_path_rejected() {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[0..4].copy_from_slice(&TAG_EXEC.to_le_bytes());
        assert_eq!(decode_request(&buf), Err(WireError::BadPath));
        assert_eq!(
            encode_request(&Request::ExecTask(String::new())),
            Err(WireError::BadPath)
        );
    }

    #[test]
    fn test_overlong_exec_path_rejected() {
        let long = "x".repeat(EXEC_ARG_SZ + 1);
        assert_eq!(
            encode_request(&Request::ExecTask(long)),
            Err(WireError::PathTooLong)
        );
        // A path of exactly the field size fits (no NUL terminator required).
        let exact = "y".repeat(EXEC_ARG_SZ);
        let frame = encode_request(&Request::ExecTask(exact.clone())).unwrap();
        assert_eq!(decode_request(&frame), Ok(Request::ExecTask(exact)));
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [STATUS_OK, STATUS_NO_SUCH_TASK, STATUS_BAD_COMMAND] {
            assert_eq!(decode_status(&encode_status(status)), status);
        }
    }
}
