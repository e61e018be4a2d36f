//! CLI arguments and chat input parsing for the Footprints client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use footprints_core::config::FootprintsConfig;

/// Footprints: chat with the preschool's parent assistant from a terminal.
#[derive(Parser, Debug)]
#[command(name = "footprints", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Chat backend URL.
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// Data directory for the local chat history.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FOOTPRINTS_CONFIG env var > ~/.footprints/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FOOTPRINTS_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Write command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut FootprintsConfig) {
        if let Some(ref endpoint) = self.endpoint {
            config.backend.endpoint = endpoint.clone();
        }
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".footprints").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.ok().map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

// =============================================================================
// Chat input
// =============================================================================

/// Decode one raw prompt line. The line ending is dropped and invalid UTF-8
/// is replaced rather than rejected.
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Read the next prompt line, `None` at end of input.
///
/// Bytes of an unfinished line stay in `buf`, so a read dropped by
/// `select!` resumes where it stopped.
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }
    let line = decode_line(buf);
    buf.clear();
    Ok(Some(line))
}

/// Prompt lines thrown away by [`discard_input_while`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discarded {
    pub lines: usize,
    /// Input reached its end while waiting.
    pub closed: bool,
}

/// Drive `work` to completion, reading and dropping every prompt line that
/// arrives meanwhile so nothing typed during the wait is sent afterwards.
pub async fn discard_input_while<F, R>(
    work: F,
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<(F::Output, Discarded)>
where
    F: std::future::Future,
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(work);
    let mut discarded = Discarded::default();
    loop {
        tokio::select! {
            biased;
            output = &mut work => return Ok((output, discarded)),
            line = read_line(reader, buf), if !discarded.closed => {
                match line? {
                    Some(_) => {
                        tracing::debug!("Input ignored while waiting for reply");
                        discarded.lines += 1;
                    }
                    None => discarded.closed = true,
                }
            }
        }
    }
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain text: appended to the draft, then the draft is sent.
    Message(String),
    ToggleEmoji,
    InsertEmoji(usize),
    /// Start or stop speech capture.
    Mic,
    Clear,
    Draft,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "Commands: /emoji [N]  /mic  /draft  /clear  /help  /quit";

/// Parse a prompt line. Anything not starting with `/` is a message.
pub fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("emoji"), None) => Input::ToggleEmoji,
        (Some("emoji"), Some(index)) => match index.parse() {
            Ok(index) => Input::InsertEmoji(index),
            Err(_) => Input::Unknown(line.trim().to_string()),
        },
        (Some("mic"), None) => Input::Mic,
        (Some("clear"), None) => Input::Clear,
        (Some("draft"), None) => Input::Draft,
        (Some("help"), None) => Input::Help,
        (Some("quit" | "exit"), None) => Input::Quit,
        _ => Input::Unknown(line.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs::try_parse_from(["footprints", "--config", "/tmp/fp.toml"]).unwrap();
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/fp.toml"));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = CliArgs::try_parse_from([
            "footprints",
            "-e",
            "http://localhost:8000/chat",
            "--data-dir",
            "/var/lib/footprints",
            "-l",
            "debug",
        ])
        .unwrap();

        let mut config = FootprintsConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.backend.endpoint, "http://localhost:8000/chat");
        assert_eq!(config.general.data_dir, "/var/lib/footprints");
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = CliArgs::try_parse_from(["footprints"]).unwrap();
        let mut config = FootprintsConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(
            config.backend.endpoint,
            FootprintsConfig::default().backend.endpoint
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("relative"), PathBuf::from("relative"));
        let expanded = expand_home("~/.footprints/data");
        assert!(expanded.ends_with(".footprints/data"));
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_decode_line_strips_line_endings() {
        assert_eq!(decode_line(b"Hello\n"), "Hello");
        assert_eq!(decode_line(b"Hello\r\n"), "Hello");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[test]
    fn test_decode_line_replaces_invalid_utf8() {
        assert_eq!(decode_line(b"hi\xff\n"), "hi\u{FFFD}");
        assert_eq!(decode_line("fees 👶\n".as_bytes()), "fees 👶");
    }

    #[tokio::test]
    async fn test_read_line_survives_invalid_utf8() {
        let mut input: &[u8] = b"hi\xff\n/quit\nlast";
        let mut buf = Vec::new();

        let first = read_line(&mut input, &mut buf).await.unwrap();
        assert_eq!(first.as_deref(), Some("hi\u{FFFD}"));
        let second = read_line(&mut input, &mut buf).await.unwrap();
        assert_eq!(second.map(|l| parse_input(&l)), Some(Input::Quit));
        // A final line without a newline still counts
        let third = read_line(&mut input, &mut buf).await.unwrap();
        assert_eq!(third.as_deref(), Some("last"));
        assert_eq!(read_line(&mut input, &mut buf).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lines_typed_while_waiting_are_dropped() {
        let mut input: &[u8] = b"second\nthird\n";
        let mut buf = Vec::new();
        let work = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            "reply"
        };

        let (output, discarded) = discard_input_while(work, &mut input, &mut buf)
            .await
            .unwrap();
        assert_eq!(output, "reply");
        assert_eq!(
            discarded,
            Discarded {
                lines: 2,
                closed: true
            }
        );
        // Nothing is left over to be sent later
        assert_eq!(read_line(&mut input, &mut buf).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_finished_work_leaves_input_unread() {
        let mut input: &[u8] = b"next\n";
        let mut buf = Vec::new();

        let (_, discarded) = discard_input_while(async {}, &mut input, &mut buf)
            .await
            .unwrap();
        assert_eq!(discarded, Discarded::default());
        assert_eq!(
            read_line(&mut input, &mut buf).await.unwrap().as_deref(),
            Some("next")
        );
    }

    #[test]
    fn test_parse_messages() {
        assert_eq!(parse_input("Hello"), Input::Message("Hello".to_string()));
        assert_eq!(parse_input(""), Input::Message(String::new()));
        // Messages keep their whitespace
        assert_eq!(parse_input("  hi  "), Input::Message("  hi  ".to_string()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("/emoji"), Input::ToggleEmoji);
        assert_eq!(parse_input("/emoji 3"), Input::InsertEmoji(3));
        assert_eq!(parse_input(" /mic "), Input::Mic);
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("/draft"), Input::Draft);
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/exit"), Input::Quit);
    }

    #[test]
    fn test_parse_unknown_commands() {
        assert_eq!(parse_input("/emoji x"), Input::Unknown("/emoji x".to_string()));
        assert_eq!(parse_input("/dance"), Input::Unknown("/dance".to_string()));
        assert_eq!(parse_input("/clear now"), Input::Unknown("/clear now".to_string()));
    }
}
