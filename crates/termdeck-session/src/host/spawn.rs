//! PTY spawn logic: build the shell command and start the output thread.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use portable_pty::{native_pty_system, Child, CommandBuilder, PtySize};
use termdeck_common::{PtyEventBus, SessionId};
use termdeck_config::schema::ShellConfig;

use super::types::{PtyError, PtyHandle, DEFAULT_COLS, DEFAULT_ROWS, PTY_READ_CHUNK};
use crate::ipc::CreateOptions;

// =============================================================================
// SHELL DETECTION
// =============================================================================

/// The user's default shell.
///
/// - Unix: `$SHELL`, falling back to `/bin/sh`
/// - Windows: `$COMSPEC`, falling back to `cmd.exe`
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }
}

/// Shell for a session: the request's, then the configured one, then the
/// detected default.
pub fn resolve_shell(config: &ShellConfig, requested: Option<&str>) -> String {
    requested
        .filter(|s| !s.is_empty())
        .or(config.program())
        .map(str::to_string)
        .unwrap_or_else(default_shell)
}

// =============================================================================
// ENVIRONMENT SANITIZATION
// =============================================================================

/// Variables inherited from the host environment. Everything else is
/// dropped so host credentials do not leak into the shell.
pub(crate) const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "PATH",
    "LANG",
    "LC_ALL",
    "LC_CTYPE",
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XDG_RUNTIME_DIR",
    "TMPDIR",
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "SYSTEMROOT",
    "COMSPEC",
];

/// Build a sanitized command for one session.
pub(crate) fn build_command(
    config: &ShellConfig,
    options: &CreateOptions,
) -> Result<(CommandBuilder, String), PtyError> {
    if !options.cwd.is_empty() && !Path::new(&options.cwd).is_dir() {
        return Err(PtyError::MissingCwd(options.cwd.clone()));
    }

    let shell = resolve_shell(config, options.shell.as_deref());
    let mut cmd = CommandBuilder::new(&shell);

    cmd.env_clear();
    for key in ALLOWED_ENV_VARS {
        if let Ok(val) = std::env::var(key) {
            cmd.env(key, val);
        }
    }
    for (key, val) in &config.env {
        cmd.env(key, val);
    }
    cmd.env("TERM", "xterm-256color");
    cmd.env("COLORTERM", "truecolor");

    #[cfg(unix)]
    if config.login_shell {
        cmd.arg("-l");
    }
    for arg in &config.args {
        cmd.arg(arg);
    }

    if !options.cwd.is_empty() {
        cmd.cwd(&options.cwd);
    }

    Ok((cmd, shell))
}

// =============================================================================
// SPAWN
// =============================================================================

/// Spawn the process for `session_id`.
///
/// A background thread publishes output on `bus` as it arrives, then waits
/// for the child and publishes its exit code.
pub(crate) fn spawn_session(
    session_id: &SessionId,
    config: &ShellConfig,
    options: &CreateOptions,
    bus: Arc<PtyEventBus>,
) -> Result<PtyHandle, PtyError> {
    let size = PtySize {
        rows: DEFAULT_ROWS,
        cols: DEFAULT_COLS,
        pixel_width: 0,
        pixel_height: 0,
    };
    let pair = native_pty_system()
        .openpty(size)
        .map_err(|e| PtyError::Open(e.to_string()))?;

    let (cmd, shell) = build_command(config, options)?;
    let child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| PtyError::Spawn {
            shell: shell.clone(),
            reason: e.to_string(),
        })?;
    drop(pair.slave);

    let pid = child.process_id();
    let killer = child.clone_killer();
    let writer = pair
        .master
        .take_writer()
        .map_err(|e| PtyError::Io(format!("failed to take writer: {e}")))?;
    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| PtyError::Io(format!("failed to clone reader: {e}")))?;

    let thread_id = session_id.clone();
    thread::Builder::new()
        .name(format!("pty-reader-{session_id}"))
        .spawn(move || pump_output(thread_id, reader, child, bus))
        .map_err(|e| PtyError::Io(format!("failed to spawn reader thread: {e}")))?;

    tracing::info!(session_id = %session_id, shell = %shell, ?pid, "PTY spawned");

    Ok(PtyHandle {
        writer,
        master: pair.master,
        killer,
        size,
        pid,
    })
}

fn pump_output(
    session_id: SessionId,
    mut reader: Box<dyn Read + Send>,
    mut child: Box<dyn Child + Send + Sync>,
    bus: Arc<PtyEventBus>,
) {
    let mut decoder = Utf8Decoder::default();
    let mut buf = [0u8; PTY_READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.push(&buf[..n]);
                if !text.is_empty() {
                    bus.data(&session_id, text);
                }
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, "PTY reader error: {e}");
                break;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        bus.data(&session_id, tail);
    }

    let code = match child.wait() {
        Ok(status) => i32::try_from(status.exit_code()).unwrap_or(i32::MAX),
        Err(e) => {
            tracing::debug!(session_id = %session_id, "PTY wait error: {e}");
            -1
        }
    };
    tracing::info!(session_id = %session_id, code, "PTY process exited");
    bus.exit(&session_id, code);
}

// =============================================================================
// UTF-8 DECODING
// =============================================================================

/// Decodes a byte stream into text without splitting multi-byte characters
/// across chunks. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is left at end of stream.
    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shell_returns_nonempty() {
        assert!(!default_shell().is_empty());
    }

    #[test]
    fn resolve_shell_precedence() {
        let mut config = ShellConfig::default();
        assert_eq!(resolve_shell(&config, Some("/bin/zsh")), "/bin/zsh");
        assert_eq!(resolve_shell(&config, None), default_shell());

        config.program = "/bin/fish".into();
        assert_eq!(resolve_shell(&config, None), "/bin/fish");
        assert_eq!(resolve_shell(&config, Some("")), "/bin/fish");
        assert_eq!(resolve_shell(&config, Some("/bin/bash")), "/bin/bash");
    }

    #[test]
    fn allowed_env_vars_contains_essentials() {
        assert!(ALLOWED_ENV_VARS.contains(&"HOME"));
        assert!(ALLOWED_ENV_VARS.contains(&"PATH"));
        assert!(ALLOWED_ENV_VARS.contains(&"USER"));
    }

    #[test]
    fn allowed_env_vars_excludes_secrets() {
        for var in ALLOWED_ENV_VARS {
            let lower = var.to_lowercase();
            for needle in ["key", "secret", "token", "password"] {
                assert!(!lower.contains(needle), "{var} looks like a secret");
            }
        }
    }

    #[test]
    fn build_command_rejects_missing_cwd() {
        let options = CreateOptions {
            cwd: "/definitely/not/a/dir".into(),
            shell: None,
        };
        let err = build_command(&ShellConfig::default(), &options).unwrap_err();
        assert!(matches!(err, PtyError::MissingCwd(_)));
    }

    #[test]
    fn build_command_uses_requested_shell() {
        let dir = std::env::temp_dir();
        let options = CreateOptions {
            cwd: dir.to_string_lossy().into_owned(),
            shell: Some("/bin/sh".into()),
        };
        let (_, shell) = build_command(&ShellConfig::default(), &options).unwrap();
        assert_eq!(shell, "/bin/sh");
    }

    #[test]
    fn decoder_passes_ascii_through() {
        let mut d = Utf8Decoder::default();
        assert_eq!(d.push(b"hello"), "hello");
        assert_eq!(d.finish(), "");
    }

    #[test]
    fn decoder_joins_split_characters() {
        let bytes = "é→".as_bytes();
        let mut d = Utf8Decoder::default();
        assert_eq!(d.push(&bytes[..1]), "");
        assert_eq!(d.push(&bytes[1..3]), "é");
        assert_eq!(d.push(&bytes[3..]), "→");
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut d = Utf8Decoder::default();
        assert_eq!(d.push(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn decoder_flushes_truncated_tail() {
        let mut d = Utf8Decoder::default();
        assert_eq!(d.push(&[b'x', 0xe2, 0x86]), "x");
        assert_eq!(d.finish(), "\u{fffd}");
    }
}
