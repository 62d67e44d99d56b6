use std::fmt;
use std::panic::Location;

/// File name written when the call site cannot be determined.
pub const UNKNOWN_FILE: &str = "<???>";

/// Source location of a logging call, rendered as `<basename>:<line>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
}

impl CallSite {
    /// The location of whoever called into the `#[track_caller]` chain
    /// that ends here.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::from_parts(Some(location.file()), Some(location.line()))
    }

    /// Build a call site from optional metadata, falling back to
    /// [`CallSite::unknown`] when the file is missing.
    pub fn from_parts(file: Option<&str>, line: Option<u32>) -> Self {
        match file {
            Some(file) if !file.is_empty() => Self {
                file: basename(file).to_string(),
                line: line.filter(|l| *l > 0).unwrap_or(1),
            },
            _ => Self::unknown(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN_FILE.to_string(),
            line: 1,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
