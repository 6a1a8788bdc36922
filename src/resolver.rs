//! Audio stream resolution.
//!
//! Turning a video ID into a playable stream URL requires a full extractor,
//! which is slow. [`YtDlpResolver`] delegates to the `yt-dlp` executable.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Format preference passed to the extractor: aac first, then vorbis.
pub const AUDIO_FORMAT: &str = "m4a/vorbis/bestaudio/best";

/// Errors raised while resolving a stream URL.
#[derive(Debug)]
pub enum ResolveError {
    /// The extractor could not be started.
    Spawn(std::io::Error),
    /// The extractor exited with a failure status.
    Failed { code: Option<i32>, stderr: String },
    /// The extractor succeeded but printed no URL.
    NoUrl,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Spawn(e) => write!(f, "could not run extractor: {}", e),
            ResolveError::Failed { code, stderr } => match code {
                Some(code) => write!(f, "extractor exited with {}: {}", code, stderr),
                None => write!(f, "extractor killed by signal: {}", stderr),
            },
            ResolveError::NoUrl => write!(f, "extractor returned no URL"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Resolves a video ID to a streamable audio URL.
pub trait StreamResolver: Send + Sync {
    fn resolve_audio_url(&self, video_id: &str) -> Result<String, ResolveError>;
}

/// Resolver backed by the `yt-dlp` command line tool.
#[derive(Clone, Debug)]
pub struct YtDlpResolver {
    program: PathBuf,
    format: String,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            format: AUDIO_FORMAT.to_string(),
        }
    }

    /// Override the format selector.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl StreamResolver for YtDlpResolver {
    fn resolve_audio_url(&self, video_id: &str) -> Result<String, ResolveError> {
        let output = Command::new(&self.program)
            .arg("--no-playlist")
            .arg("--format")
            .arg(&self.format)
            .arg("--get-url")
            .arg(watch_url(video_id))
            .output()
            .map_err(ResolveError::Spawn)?;

        if !output.status.success() {
            return Err(ResolveError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or(ResolveError::NoUrl)
    }
}

/// Public watch page URL of a video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
