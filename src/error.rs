use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum XfmError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("missing input: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },
    #[error("could not start {tool}: {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl XfmError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        XfmError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
