use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum TableError {
    /// File could not be opened, read or written.
    Io { path: PathBuf, message: String },
    /// Extension is not a known table format.
    UnsupportedFormat { path: PathBuf, extension: String },
    /// File opened but has no header row or no sheet.
    Empty { path: PathBuf },
    /// Content could not be parsed in the detected format.
    Parse { path: PathBuf, message: String },
}

impl TableError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(path: &Path, err: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::Empty { path }
            | Self::Parse { path, .. } => path,
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::UnsupportedFormat { path, extension } => {
                write!(f, "{}: unsupported format '{extension}'", path.display())
            }
            Self::Empty { path } => write!(f, "{}: no header row", path.display()),
            Self::Parse { path, message } => {
                write!(f, "{}: parse error: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for TableError {}
