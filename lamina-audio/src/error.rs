//! Loading errors.

use std::error;
use std::fmt;
use std::io;

/// Reasons a sound can fail to load.
#[derive(Debug)]
pub enum LoadError {
  /// The resource couldn’t be read.
  Io(io::Error),
  /// The data is malformed or truncated.
  Decode(String),
  /// The data is well-formed but uses an encoding we can’t convert.
  UnsupportedFormat(String),
  /// The mixer has no line able to play the format.
  Line(String),
  /// The loading job panicked.
  Panicked(String),
}

impl fmt::Display for LoadError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      LoadError::Io(ref e) => write!(f, "I/O error: {}", e),
      LoadError::Decode(ref reason) => write!(f, "cannot decode audio: {}", reason),
      LoadError::UnsupportedFormat(ref format) => write!(f, "unsupported audio format: {}", format),
      LoadError::Line(ref reason) => write!(f, "no audio line available: {}", reason),
      LoadError::Panicked(ref reason) => write!(f, "audio loading panicked: {}", reason),
    }
  }
}

impl error::Error for LoadError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      LoadError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for LoadError {
  fn from(e: io::Error) -> Self {
    match e.kind() {
      io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => LoadError::Decode(e.to_string()),
      _ => LoadError::Io(e),
    }
  }
}
