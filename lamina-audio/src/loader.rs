//! Asynchronous sound loading.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use lamina::deferred::{deferred, Deferred};
use lamina::exec::Exec;

use crate::convert;
use crate::error::LoadError;
use crate::format::Encoding;
use crate::mixer::Mixer;
use crate::resource::AudioResource;

/// Sound loader.
///
/// Every sound is loaded by a job scheduled on the executor, so an [`Exec`] running jobs on
/// other threads keeps the caller responsive. Cloning is cheap and shares the executor and the
/// mixer.
pub struct Audio<M> {
  exec: Arc<dyn Exec>,
  mixer: Arc<M>,
}

impl<M> Audio<M>
where
  M: Mixer,
{
  pub fn new(exec: Arc<dyn Exec>, mixer: M) -> Self {
    Audio {
      exec,
      mixer: Arc::new(mixer),
    }
  }

  pub fn mixer(&self) -> &M {
    &self.mixer
  }

  /// Load a sound.
  ///
  /// The returned deferred is pending until the job has run; it then holds the clip or the
  /// reason the sound couldn’t be loaded. Music is opened on the mixer’s long-form path, after
  /// conversion to signed 16-bit PCM if it isn’t signed PCM already. A panic while loading
  /// resolves the deferred with [`LoadError::Panicked`].
  pub fn create_sound<R>(&self, resource: R, music: bool) -> Deferred<M::Clip, LoadError>
  where
    R: AudioResource,
  {
    let (resolver, sound) = deferred();
    let mixer = self.mixer.clone();

    self.exec.invoke_async(Box::new(move || {
      let result = panic::catch_unwind(AssertUnwindSafe(|| load(&*mixer, &resource, music)))
        .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(&*payload))));

      match result {
        Ok(clip) => {
          log::debug!("loaded {}", resource.name());
          resolver.succeed(clip);
        }

        Err(e) => {
          log::warn!("cannot load {}: {}", resource.name(), e);
          resolver.fail(e);
        }
      }
    }));

    sound
  }
}

fn load<M, R>(mixer: &M, resource: &R, music: bool) -> Result<M::Clip, LoadError>
where
  M: Mixer,
  R: AudioResource,
{
  let stream = resource.open_audio_stream()?;

  log::trace!("opened {}: {}", resource.name(), stream.format);

  if !music {
    return mixer.open_clip(stream);
  }

  let stream = if stream.format.encoding == Encoding::PcmSigned {
    stream
  } else {
    convert::to_pcm16(stream)?
  };

  mixer.open_music(stream)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(msg) = payload.downcast_ref::<&str>() {
    (*msg).to_owned()
  } else if let Some(msg) = payload.downcast_ref::<String>() {
    msg.clone()
  } else {
    "unknown panic".to_owned()
  }
}

impl<M> Clone for Audio<M> {
  fn clone(&self) -> Self {
    Audio {
      exec: self.exec.clone(),
      mixer: self.mixer.clone(),
    }
  }
}

impl<M> fmt::Debug for Audio<M>
where
  M: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Audio").field("mixer", &self.mixer).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::format::AudioFormat;
  use crate::mixer::BufferMixer;
  use crate::resource::MemoryResource;
  use crate::wav::write_wav;
  use lamina::deferred::State;
  use lamina::exec::Immediate;

  fn audio() -> Audio<BufferMixer> {
    Audio::new(Arc::new(Immediate), BufferMixer)
  }

  #[test]
  fn clip() {
    let format = AudioFormat::pcm(Encoding::PcmSigned, 8000, 16, 1, false);
    let resource = MemoryResource::wav("click", write_wav(&format, &[0; 8]));

    let sound = audio().create_sound(resource, false);

    match sound.state() {
      State::Succeeded(clip) => {
        assert_eq!(*clip.format(), format);
        assert_eq!(clip.frames(), 4);
        assert!(!clip.is_music());
      }

      _ => panic!("clip not loaded"),
    }
  }

  #[test]
  fn corrupt_music() {
    let resource = MemoryResource::wav("theme", vec![0u8; 64]);
    let sound = audio().create_sound(resource, true);

    assert!(matches!(sound.state(), State::Failed(LoadError::Decode(_))));
  }

  #[test]
  fn alaw_music_is_converted() {
    let format = AudioFormat::pcm(Encoding::ALaw, 8000, 8, 2, false);
    let resource = MemoryResource::raw("theme", format, vec![0xD5; 6]);

    let sound = audio().create_sound(resource, true);
    let clip = match sound.result() {
      Some(Ok(clip)) => clip,
      other => panic!("unexpected result: {:?}", other.map(|r| r.is_ok())),
    };

    assert_eq!(*clip.format(), format.pcm_signed16());
    assert_eq!(clip.frames(), 3);
    assert_eq!(&clip.data()[..2], &8i16.to_le_bytes());
    assert!(clip.is_music());
  }

  #[test]
  fn signed_music_is_kept_as_is() {
    let format = AudioFormat::pcm(Encoding::PcmSigned, 48000, 24, 1, true);
    let resource = MemoryResource::raw("theme", format, vec![1, 2, 3]);

    let sound = audio().create_sound(resource, true);

    match sound.state() {
      State::Succeeded(clip) => assert_eq!(*clip.format(), format),
      _ => panic!("music not loaded"),
    }
  }

  #[test]
  fn unsupported_clip_line() {
    let format = AudioFormat::pcm(Encoding::ULaw, 8000, 8, 1, false);
    let resource = MemoryResource::raw("beep", format, vec![0xFF; 4]);

    let sound = audio().create_sound(resource, false);
    assert!(matches!(sound.state(), State::Failed(LoadError::Line(_))));
  }

  struct BrokenMixer;

  impl Mixer for BrokenMixer {
    type Clip = ();

    fn open_clip(&self, _: crate::resource::AudioStream) -> Result<(), LoadError> {
      panic!("line exploded");
    }

    fn open_music(&self, _: crate::resource::AudioStream) -> Result<(), LoadError> {
      panic!("line exploded for {}", "music");
    }
  }

  #[test]
  fn panicking_mixer_still_resolves() {
    let audio = Audio::new(Arc::new(Immediate), BrokenMixer);
    let format = AudioFormat::pcm(Encoding::PcmSigned, 8000, 16, 1, false);

    let clip = audio.create_sound(MemoryResource::raw("click", format, vec![0; 4]), false);
    match clip.state() {
      State::Failed(LoadError::Panicked(msg)) => assert_eq!(msg, "line exploded"),
      _ => panic!("clip not failed"),
    }

    let music = audio.create_sound(MemoryResource::raw("theme", format, vec![0; 4]), true);
    match music.state() {
      State::Failed(LoadError::Panicked(msg)) => assert_eq!(msg, "line exploded for music"),
      _ => panic!("music not failed"),
    }
  }
}
