//! Sound resources.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::format::AudioFormat;
use crate::wav;

/// An opened sound: its format and a reader over its interleaved samples.
pub struct AudioStream {
  pub format: AudioFormat,
  pub reader: Box<dyn Read + Send>,
}

impl AudioStream {
  pub fn new<R>(format: AudioFormat, reader: R) -> Self
  where
    R: Read + Send + 'static,
  {
    AudioStream {
      format,
      reader: Box::new(reader),
    }
  }

  /// Read every remaining sample byte.
  pub fn read_all(mut self) -> Result<Vec<u8>, LoadError> {
    let mut data = Vec::new();
    self.reader.read_to_end(&mut data)?;
    Ok(data)
  }
}

impl fmt::Debug for AudioStream {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("AudioStream")
      .field("format", &self.format)
      .finish()
  }
}

/// Something a sound can be read from.
///
/// Opening happens on a loader thread, hence the `Send` bound.
pub trait AudioResource: Send + 'static {
  /// Name used in diagnostics.
  fn name(&self) -> &str;

  fn open_audio_stream(&self) -> Result<AudioStream, LoadError>;
}

/// A sound held in memory.
///
/// Without a declared format, the bytes are parsed as a WAVE file; with one, they are taken as
/// raw samples in that format.
#[derive(Clone, Debug)]
pub struct MemoryResource {
  name: String,
  bytes: Arc<[u8]>,
  format: Option<AudioFormat>,
}

impl MemoryResource {
  pub fn wav<N, B>(name: N, bytes: B) -> Self
  where
    N: Into<String>,
    B: Into<Arc<[u8]>>,
  {
    MemoryResource {
      name: name.into(),
      bytes: bytes.into(),
      format: None,
    }
  }

  pub fn raw<N, B>(name: N, format: AudioFormat, bytes: B) -> Self
  where
    N: Into<String>,
    B: Into<Arc<[u8]>>,
  {
    MemoryResource {
      name: name.into(),
      bytes: bytes.into(),
      format: Some(format),
    }
  }
}

// lets a shared buffer back a reader without copying it
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl AudioResource for MemoryResource {
  fn name(&self) -> &str {
    &self.name
  }

  fn open_audio_stream(&self) -> Result<AudioStream, LoadError> {
    let reader = Cursor::new(SharedBytes(self.bytes.clone()));

    match self.format {
      Some(format) => Ok(AudioStream::new(format, reader)),
      None => wav::open_wav(reader),
    }
  }
}

/// A WAVE file on disk.
#[derive(Clone, Debug)]
pub struct FileResource {
  path: PathBuf,
  name: String,
}

impl FileResource {
  pub fn new<P>(path: P) -> Self
  where
    P: AsRef<Path>,
  {
    let path = path.as_ref().to_owned();
    let name = path.display().to_string();

    FileResource { path, name }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl AudioResource for FileResource {
  fn name(&self) -> &str {
    &self.name
  }

  fn open_audio_stream(&self) -> Result<AudioStream, LoadError> {
    let file = File::open(&self.path)?;
    wav::open_wav(BufReader::new(file))
  }
}
