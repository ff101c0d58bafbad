use std::{error::Error, fmt::Display};

use crate::trace_file::TraceFileError;

/// Anything that can stop one of the terminal interfaces.
#[derive(Debug)]
pub enum GuiError {
    /// The terminal could not be set up, drawn to, or restored
    IOError(std::io::Error),
    /// A finished trial could not be saved
    TraceFile(TraceFileError),
}

impl Display for GuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuiError::IOError(e) => write!(f, "terminal error: {}", e),
            GuiError::TraceFile(e) => write!(f, "could not save trial: {}", e),
        }
    }
}

impl Error for GuiError {}

impl From<std::io::Error> for GuiError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<TraceFileError> for GuiError {
    fn from(value: TraceFileError) -> Self {
        Self::TraceFile(value)
    }
}
