//! RIFF/WAVE headers.
//!
//! Only the `fmt ` and `data` chunks matter; every other chunk is skipped. The returned stream
//! reads the sample data only, so trailing chunks are never touched.

use std::io::{self, Read};

use crate::error::LoadError;
use crate::format::{AudioFormat, Encoding};
use crate::resource::AudioStream;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_ALAW: u16 = 0x0006;
const WAVE_FORMAT_MULAW: u16 = 0x0007;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

fn decode_error(reason: &str) -> LoadError {
  LoadError::Decode(reason.to_owned())
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
  u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
  u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse the body of a `fmt ` chunk.
pub fn parse_fmt(chunk: &[u8]) -> Result<AudioFormat, LoadError> {
  if chunk.len() < 16 {
    return Err(decode_error("fmt chunk too short"));
  }

  let mut tag = u16_at(chunk, 0);
  let channels = u16_at(chunk, 2);
  let sample_rate = u32_at(chunk, 4);
  let block_align = u16_at(chunk, 12);
  let bits = u16_at(chunk, 14);

  if tag == WAVE_FORMAT_EXTENSIBLE {
    if chunk.len() < 26 {
      return Err(decode_error("extensible fmt chunk too short"));
    }

    // first two bytes of the sub-format GUID
    tag = u16_at(chunk, 24);
  }

  let encoding = match tag {
    WAVE_FORMAT_PCM if bits <= 8 => Encoding::PcmUnsigned,
    WAVE_FORMAT_PCM => Encoding::PcmSigned,
    WAVE_FORMAT_IEEE_FLOAT => Encoding::PcmFloat,
    WAVE_FORMAT_ALAW => Encoding::ALaw,
    WAVE_FORMAT_MULAW => Encoding::ULaw,
    _ => {
      return Err(LoadError::UnsupportedFormat(format!(
        "WAVE format tag 0x{:04X}",
        tag
      )))
    }
  };

  if channels == 0 || bits == 0 {
    return Err(decode_error("no channels or zero-sized samples"));
  }

  let format = AudioFormat::pcm(encoding, sample_rate, bits, channels, false);

  if format.frame_size != block_align as u32 {
    return Err(LoadError::Decode(format!(
      "block alignment {} doesn’t match {} channels of {} bits",
      block_align, channels, bits
    )));
  }

  Ok(format)
}

fn read_tag<R>(reader: &mut R) -> Result<Option<[u8; 4]>, LoadError>
where
  R: Read,
{
  let mut tag = [0; 4];
  let mut read = 0;

  while read < tag.len() {
    match reader.read(&mut tag[read..]) {
      Ok(0) if read == 0 => return Ok(None),
      Ok(0) => return Err(decode_error("truncated chunk header")),
      Ok(n) => read += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
      Err(e) => return Err(e.into()),
    }
  }

  Ok(Some(tag))
}

fn read_u32<R>(reader: &mut R) -> Result<u32, LoadError>
where
  R: Read,
{
  let mut bytes = [0; 4];
  reader.read_exact(&mut bytes)?;
  Ok(u32::from_le_bytes(bytes))
}

/// Open a WAVE stream: parse its header and return a stream over its sample data.
pub fn open_wav<R>(mut reader: R) -> Result<AudioStream, LoadError>
where
  R: Read + Send + 'static,
{
  if read_tag(&mut reader)? != Some(*b"RIFF") {
    return Err(decode_error("not a RIFF stream"));
  }

  read_u32(&mut reader)?;

  if read_tag(&mut reader)? != Some(*b"WAVE") {
    return Err(decode_error("not a WAVE stream"));
  }

  let mut format = None;

  loop {
    let tag = match read_tag(&mut reader)? {
      Some(tag) => tag,
      None => return Err(decode_error("missing data chunk")),
    };
    let len = read_u32(&mut reader)? as u64;

    match &tag {
      b"fmt " => {
        let mut chunk = Vec::new();
        (&mut reader).take(len).read_to_end(&mut chunk)?;

        if (chunk.len() as u64) < len {
          return Err(decode_error("truncated fmt chunk"));
        }

        format = Some(parse_fmt(&chunk)?);
      }

      b"data" => {
        let format = format.ok_or_else(|| decode_error("data chunk before fmt chunk"))?;

        return Ok(AudioStream {
          format,
          reader: Box::new(reader.take(len)),
        });
      }

      _ => {
        log::trace!("skipping {:?} chunk", String::from_utf8_lossy(&tag));
        io::copy(&mut (&mut reader).take(len), &mut io::sink())?;
      }
    }

    // chunks are word-aligned
    if len % 2 == 1 {
      io::copy(&mut (&mut reader).take(1), &mut io::sink())?;
    }
  }
}

/// Build a canonical WAVE file around PCM data.
pub fn write_wav(format: &AudioFormat, data: &[u8]) -> Vec<u8> {
  let tag = match format.encoding {
    Encoding::PcmSigned | Encoding::PcmUnsigned => WAVE_FORMAT_PCM,
    Encoding::PcmFloat => WAVE_FORMAT_IEEE_FLOAT,
    Encoding::ALaw => WAVE_FORMAT_ALAW,
    Encoding::ULaw => WAVE_FORMAT_MULAW,
  };
  let byte_rate = format.sample_rate.saturating_mul(format.frame_size);
  let block_align = format.frame_size.min(u16::MAX as u32) as u16;

  let mut out = Vec::with_capacity(44 + data.len() + 1);
  out.extend_from_slice(b"RIFF");
  out.extend_from_slice(&(36 + data.len() as u32 + data.len() as u32 % 2).to_le_bytes());
  out.extend_from_slice(b"WAVEfmt ");
  out.extend_from_slice(&16u32.to_le_bytes());
  out.extend_from_slice(&tag.to_le_bytes());
  out.extend_from_slice(&format.channels.to_le_bytes());
  out.extend_from_slice(&format.sample_rate.to_le_bytes());
  out.extend_from_slice(&byte_rate.to_le_bytes());
  out.extend_from_slice(&block_align.to_le_bytes());
  out.extend_from_slice(&format.sample_size_bits.to_le_bytes());
  out.extend_from_slice(b"data");
  out.extend_from_slice(&(data.len() as u32).to_le_bytes());
  out.extend_from_slice(data);

  if data.len() % 2 == 1 {
    out.push(0);
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn reads_pcm16() {
    let format = AudioFormat::pcm(Encoding::PcmSigned, 22050, 16, 2, false);
    let bytes = write_wav(&format, &[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut stream = open_wav(Cursor::new(bytes)).unwrap();
    assert_eq!(stream.format, format);

    let mut data = Vec::new();
    stream.reader.read_to_end(&mut data).unwrap();
    assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
  }

  #[test]
  fn eight_bit_pcm_is_unsigned() {
    let format = AudioFormat::pcm(Encoding::PcmUnsigned, 8000, 8, 1, false);
    let stream = open_wav(Cursor::new(write_wav(&format, &[128; 3]))).unwrap();

    assert_eq!(stream.format.encoding, Encoding::PcmUnsigned);
  }

  #[test]
  fn skips_unknown_chunks() {
    let format = AudioFormat::pcm(Encoding::ULaw, 8000, 8, 1, false);
    let plain = write_wav(&format, &[0xFF]);

    // splice a LIST chunk of odd length between fmt and data
    let mut bytes = plain[..36].to_vec();
    bytes.extend_from_slice(b"LIST");
    bytes.extend_from_slice(&3u32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 0]);
    bytes.extend_from_slice(&plain[36..]);

    let mut stream = open_wav(Cursor::new(bytes)).unwrap();
    let mut data = Vec::new();
    stream.reader.read_to_end(&mut data).unwrap();

    assert_eq!(stream.format.encoding, Encoding::ULaw);
    assert_eq!(data, vec![0xFF]);
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(
      open_wav(Cursor::new(b"OggS\0\0\0\0".to_vec())),
      Err(LoadError::Decode(_))
    ));
    assert!(matches!(
      open_wav(Cursor::new(Vec::new())),
      Err(LoadError::Decode(_))
    ));
  }

  #[test]
  fn rejects_missing_data() {
    let format = AudioFormat::pcm(Encoding::PcmSigned, 8000, 16, 1, false);
    let bytes = write_wav(&format, &[]);

    assert!(matches!(
      open_wav(Cursor::new(bytes[..36].to_vec())),
      Err(LoadError::Decode(_))
    ));
  }

  #[test]
  fn unsupported_tag() {
    let mut fmt = [0u8; 16];
    fmt[0..2].copy_from_slice(&0x0055u16.to_le_bytes()); // MP3
    fmt[2..4].copy_from_slice(&1u16.to_le_bytes());
    fmt[12..14].copy_from_slice(&2u16.to_le_bytes());
    fmt[14..16].copy_from_slice(&16u16.to_le_bytes());

    assert!(matches!(
      parse_fmt(&fmt),
      Err(LoadError::UnsupportedFormat(_))
    ));
  }

  #[test]
  fn extensible_pcm() {
    let mut fmt = [0u8; 40];
    fmt[0..2].copy_from_slice(&WAVE_FORMAT_EXTENSIBLE.to_le_bytes());
    fmt[2..4].copy_from_slice(&2u16.to_le_bytes());
    fmt[4..8].copy_from_slice(&48000u32.to_le_bytes());
    fmt[12..14].copy_from_slice(&6u16.to_le_bytes());
    fmt[14..16].copy_from_slice(&24u16.to_le_bytes());
    fmt[24..26].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());

    let format = parse_fmt(&fmt).unwrap();
    assert_eq!(format.encoding, Encoding::PcmSigned);
    assert_eq!(format.sample_size_bits, 24);
    assert_eq!(format.frame_size, 6);
  }

  #[test]
  fn oversized_frames_are_rejected() {
    let mut fmt = [0u8; 16];
    fmt[0..2].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    fmt[2..4].copy_from_slice(&0x8000u16.to_le_bytes());
    fmt[4..8].copy_from_slice(&44100u32.to_le_bytes());
    fmt[12..14].copy_from_slice(&4u16.to_le_bytes());
    fmt[14..16].copy_from_slice(&16u16.to_le_bytes());

    assert!(matches!(parse_fmt(&fmt), Err(LoadError::Decode(_))));
  }
}
