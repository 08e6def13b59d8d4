use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A file could not be opened or created.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A corpus or table line that does not have the expected shape.
    #[error("line {line}: {msg}")]
    InvalidFormat { line: usize, msg: String },

    #[error("invalid parameter {name}: {msg}")]
    InvalidParameter { name: String, msg: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_format<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::InvalidFormat {
            line,
            msg: msg.into(),
        }
    }

    pub(crate) fn invalid_parameter<S: Into<String>>(name: &str, msg: S) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            msg: msg.into(),
        }
    }
}

/// Parses the boolean spellings accepted by `name=value` parameters.
pub(crate) fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::invalid_parameter(
            name,
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
