/// Error taxonomy for one file's pipeline.
///
/// Per-file errors never abort a multi-file run — the orchestrator's caller
/// is expected to catch these, log them, and move on to the next file.
#[derive(Debug)]
pub enum EngineError {
    /// Malformed configuration; fatal to the whole run (caught before any
    /// file is touched).
    ConfigInvalid(String),
    /// The source did not parse; the file is skipped with this message
    /// recorded as a warning.
    ParseFailed(String),
    /// An edit batch contained two overlapping edits — a planner bug.
    /// Aborts the file, leaving `original_source` unchanged.
    OverlappingEdits,
    /// An edit's byte range fell outside the source it was built against.
    InvalidRange,
    /// The external formatter failed; non-fatal, `source_3` is kept as-is.
    FormatFailed(String),
    /// I/O failure reading or writing a file; fatal for that file.
    Io(std::io::Error),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigInvalid(msg) => write!(f, "invalid configuration: {msg}"),
            Self::ParseFailed(msg) => write!(f, "parse failed: {msg}"),
            Self::OverlappingEdits => write!(f, "internal error: overlapping edits"),
            Self::InvalidRange => write!(f, "edit range out of bounds"),
            Self::FormatFailed(msg) => write!(f, "formatter failed: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
