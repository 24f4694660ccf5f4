//! Sample formats.

use std::fmt;

/// How samples are encoded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoding {
  /// Two’s complement integers.
  PcmSigned,
  /// Offset-binary integers.
  PcmUnsigned,
  /// IEEE 754 floats in *[-1; 1]*.
  PcmFloat,
  /// G.711 µ-law, 8 bits per sample.
  ULaw,
  /// G.711 A-law, 8 bits per sample.
  ALaw,
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Encoding::PcmSigned => f.write_str("PCM_SIGNED"),
      Encoding::PcmUnsigned => f.write_str("PCM_UNSIGNED"),
      Encoding::PcmFloat => f.write_str("PCM_FLOAT"),
      Encoding::ULaw => f.write_str("ULAW"),
      Encoding::ALaw => f.write_str("ALAW"),
    }
  }
}

/// Layout of an interleaved sample stream.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AudioFormat {
  pub encoding: Encoding,
  /// Samples per second and per channel.
  pub sample_rate: u32,
  pub sample_size_bits: u16,
  pub channels: u16,
  /// Bytes per frame, a frame holding one sample of every channel.
  pub frame_size: u32,
  /// Frames per second.
  pub frame_rate: u32,
  pub big_endian: bool,
}

impl AudioFormat {
  /// Interleaved PCM with one frame per sample period.
  pub fn pcm(
    encoding: Encoding,
    sample_rate: u32,
    sample_size_bits: u16,
    channels: u16,
    big_endian: bool,
  ) -> Self {
    AudioFormat {
      encoding,
      sample_rate,
      sample_size_bits,
      channels,
      frame_size: channels as u32 * ((sample_size_bits as u32 + 7) / 8),
      frame_rate: sample_rate,
      big_endian,
    }
  }

  /// Signed 16-bit little-endian PCM with the same channels and rate.
  pub fn pcm_signed16(&self) -> Self {
    AudioFormat {
      encoding: Encoding::PcmSigned,
      sample_rate: self.sample_rate,
      sample_size_bits: 16,
      channels: self.channels,
      frame_size: self.channels as u32 * 2,
      frame_rate: self.sample_rate,
      big_endian: false,
    }
  }

  /// Bytes per sample of a single channel.
  pub fn sample_bytes(&self) -> usize {
    (self.sample_size_bits as usize + 7) / 8
  }
}

impl fmt::Display for AudioFormat {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{} {} Hz, {} bit, {} channels, {} bytes/frame, {}",
      self.encoding,
      self.sample_rate,
      self.sample_size_bits,
      self.channels,
      self.frame_size,
      if self.big_endian {
        "big-endian"
      } else {
        "little-endian"
      }
    )
  }
}
