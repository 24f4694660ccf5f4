//! Mixers turn opened streams into playable clips.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LoadError;
use crate::format::{AudioFormat, Encoding};
use crate::resource::AudioStream;

/// Audio output able to take sounds.
///
/// Both methods run on loader threads.
pub trait Mixer: Send + Sync + 'static {
  /// A loaded, playable sound.
  type Clip: Send + Sync + 'static;

  /// Open a short sound on a regular line.
  fn open_clip(&self, stream: AudioStream) -> Result<Self::Clip, LoadError>;

  /// Open a long sound, typically music.
  ///
  /// The stream is always signed PCM; the loader converts anything else beforehand.
  fn open_music(&self, stream: AudioStream) -> Result<Self::Clip, LoadError>;
}

/// A sound fully read into memory.
#[derive(Clone, Debug)]
pub struct BufferedClip {
  format: AudioFormat,
  data: Arc<[u8]>,
  music: bool,
}

impl BufferedClip {
  pub fn format(&self) -> &AudioFormat {
    &self.format
  }

  /// Interleaved sample bytes.
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn frames(&self) -> usize {
    self.data.len() / self.format.frame_size.max(1) as usize
  }

  pub fn duration(&self) -> Duration {
    if self.format.frame_rate == 0 {
      return Duration::ZERO;
    }

    Duration::from_secs_f64(self.frames() as f64 / self.format.frame_rate as f64)
  }

  /// Whether the clip was opened as music.
  pub fn is_music(&self) -> bool {
    self.music
  }
}

/// A mixer buffering every sound in memory.
///
/// Regular lines take 8 and 16-bit integer PCM. Music takes signed PCM of any width.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferMixer;

impl BufferMixer {
  pub fn new() -> Self {
    BufferMixer
  }

  fn buffer(stream: AudioStream, music: bool) -> Result<BufferedClip, LoadError> {
    let format = stream.format;
    let data = stream.read_all()?;
    let frame_size = format.frame_size as usize;

    if frame_size == 0 || data.len() % frame_size != 0 {
      return Err(LoadError::Decode(format!(
        "{} bytes don’t make whole frames of {} bytes",
        data.len(),
        frame_size
      )));
    }

    log::trace!("buffered {} bytes of {}", data.len(), format);

    Ok(BufferedClip {
      format,
      data: data.into(),
      music,
    })
  }
}

impl Mixer for BufferMixer {
  type Clip = BufferedClip;

  fn open_clip(&self, stream: AudioStream) -> Result<Self::Clip, LoadError> {
    let format = &stream.format;
    let supported = matches!(format.encoding, Encoding::PcmSigned | Encoding::PcmUnsigned)
      && (format.sample_size_bits == 8 || format.sample_size_bits == 16);

    if !supported {
      return Err(LoadError::Line(format!("no line supports {}", format)));
    }

    Self::buffer(stream, false)
  }

  fn open_music(&self, stream: AudioStream) -> Result<Self::Clip, LoadError> {
    if stream.format.encoding != Encoding::PcmSigned {
      return Err(LoadError::UnsupportedFormat(stream.format.to_string()));
    }

    Self::buffer(stream, true)
  }
}
