use std::fmt;

use super::error::RunnerError;

/// How a SQL listing's result is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Execute the statement; no result expected.
    Run,
    /// Expect exactly one row and print it.
    One,
    /// Print the first rows of the result.
    Top,
    /// Write the full result to a CSV file.
    Save,
}

impl RunMode {
    pub fn parse(s: &str) -> Result<Self, RunnerError> {
        match s {
            "run" => Ok(Self::Run),
            "one" => Ok(Self::One),
            "top" => Ok(Self::Top),
            "save" => Ok(Self::Save),
            other => Err(RunnerError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Run => "run",
            Self::One => "one",
            Self::Top => "top",
            Self::Save => "save",
        };
        write!(f, "{s}")
    }
}
