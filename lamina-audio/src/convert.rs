//! Conversion to signed 16-bit PCM.
//!
//! [`Pcm16Reader`] wraps a sample stream in any supported encoding and yields signed 16-bit
//! little-endian samples with the same channel layout and rate. Wider samples are truncated to
//! their 16 most significant bits; G.711 samples are expanded.

use std::io::{self, Read};

use crate::error::LoadError;
use crate::format::{AudioFormat, Encoding};
use crate::resource::AudioStream;

const CHUNK: usize = 4096;

/// Streaming converter to signed 16-bit little-endian PCM.
pub struct Pcm16Reader<R> {
  inner: R,
  source: AudioFormat,
  // bytes of an incomplete trailing sample
  input: Vec<u8>,
  output: Vec<u8>,
  pos: usize,
}

impl<R> Pcm16Reader<R>
where
  R: Read,
{
  /// Wrap a reader of samples in `source` format.
  pub fn new(inner: R, source: AudioFormat) -> Result<Self, LoadError> {
    let bits = source.sample_size_bits;
    let supported = match source.encoding {
      Encoding::PcmSigned | Encoding::PcmUnsigned => bits % 8 == 0 && (8..=32).contains(&bits),
      Encoding::PcmFloat => bits == 32 || bits == 64,
      Encoding::ULaw | Encoding::ALaw => bits == 8,
    };

    if !supported {
      return Err(LoadError::UnsupportedFormat(source.to_string()));
    }

    Ok(Pcm16Reader {
      inner,
      source,
      input: Vec::new(),
      output: Vec::new(),
      pos: 0,
    })
  }

  /// Format of the converted samples.
  pub fn format(&self) -> AudioFormat {
    self.source.pcm_signed16()
  }

  fn refill(&mut self) -> io::Result<()> {
    let sample_bytes = self.source.sample_bytes();
    let mut chunk = [0; CHUNK];

    self.output.clear();
    self.pos = 0;

    while self.output.is_empty() {
      let read = match self.inner.read(&mut chunk) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
        Err(e) => return Err(e),
      };

      if read == 0 {
        if self.input.is_empty() {
          return Ok(());
        }

        return Err(io::Error::new(
          io::ErrorKind::InvalidData,
          "stream ends in the middle of a sample",
        ));
      }

      self.input.extend_from_slice(&chunk[..read]);
      let whole = self.input.len() - self.input.len() % sample_bytes;

      for sample in self.input[..whole].chunks_exact(sample_bytes) {
        let value = decode_sample(&self.source, sample);
        self.output.extend_from_slice(&value.to_le_bytes());
      }

      self.input.drain(..whole);
    }

    Ok(())
  }
}

impl<R> Read for Pcm16Reader<R>
where
  R: Read,
{
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if self.pos == self.output.len() {
      self.refill()?;
    }

    let available = &self.output[self.pos..];
    let n = available.len().min(buf.len());
    buf[..n].copy_from_slice(&available[..n]);
    self.pos += n;

    Ok(n)
  }
}

/// Convert a stream to signed 16-bit little-endian PCM.
pub fn to_pcm16(stream: AudioStream) -> Result<AudioStream, LoadError> {
  let reader = Pcm16Reader::new(stream.reader, stream.format)?;
  let format = reader.format();

  log::debug!("converting {} to {}", stream.format, format);

  Ok(AudioStream::new(format, reader))
}

fn decode_sample(format: &AudioFormat, bytes: &[u8]) -> i16 {
  match format.encoding {
    Encoding::PcmSigned => high_word(format, bytes),
    Encoding::PcmUnsigned => (high_word(format, bytes) as u16 ^ 0x8000) as i16,
    Encoding::PcmFloat => {
      let value = float_sample(format, bytes);
      (value.max(-1.).min(1.) * i16::MAX as f64) as i16
    }
    Encoding::ULaw => ulaw_to_linear(bytes[0]),
    Encoding::ALaw => alaw_to_linear(bytes[0]),
  }
}

// the 16 most significant bits of an integer sample, as two’s complement bit pattern
fn high_word(format: &AudioFormat, bytes: &[u8]) -> i16 {
  let n = bytes.len();

  let (hi, lo) = match (n, format.big_endian) {
    (1, _) => (bytes[0], 0),
    (_, true) => (bytes[0], bytes[1]),
    (_, false) => (bytes[n - 1], bytes[n - 2]),
  };

  i16::from_be_bytes([hi, lo])
}

fn float_sample(format: &AudioFormat, bytes: &[u8]) -> f64 {
  match bytes.len() {
    4 => {
      let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];

      if format.big_endian {
        f32::from_be_bytes(raw) as f64
      } else {
        f32::from_le_bytes(raw) as f64
      }
    }

    _ => {
      let mut raw = [0; 8];
      raw.copy_from_slice(&bytes[..8]);

      if format.big_endian {
        f64::from_be_bytes(raw)
      } else {
        f64::from_le_bytes(raw)
      }
    }
  }
}

/// Expand a G.711 µ-law sample.
pub fn ulaw_to_linear(sample: u8) -> i16 {
  let sample = !sample;
  let exponent = (sample >> 4) & 0x07;
  let mantissa = (sample & 0x0F) as i32;
  let magnitude = (((mantissa << 3) + 0x84) << exponent) - 0x84;

  if sample & 0x80 != 0 {
    -magnitude as i16
  } else {
    magnitude as i16
  }
}

/// Expand a G.711 A-law sample.
pub fn alaw_to_linear(sample: u8) -> i16 {
  let sample = sample ^ 0x55;
  let exponent = (sample >> 4) & 0x07;
  let mantissa = (sample & 0x0F) as i32;
  let magnitude = match exponent {
    0 => (mantissa << 4) + 8,
    e => ((mantissa << 4) + 0x108) << (e - 1),
  };

  if sample & 0x80 != 0 {
    magnitude as i16
  } else {
    -magnitude as i16
  }
}
