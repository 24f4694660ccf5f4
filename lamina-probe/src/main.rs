use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use lamina::exec::WorkerPool;
use lamina::layer::{rotation, translation};
use lamina::trace::{Call, TraceBackend};
use lamina::{ContextOpt, GLContext, GraphicsError, GroupLayer, Layer, TextureHandle};
use lamina_audio::{Audio, BufferMixer, FileResource};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(subcommand)]
  cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
  /// Composite a demo scene on the recording backend and print the driver calls.
  Trace {
    #[structopt(short, long, default_value = "2")]
    /// Number of frames to paint.
    frames: usize,

    #[structopt(short, long)]
    /// PNG image to use as the sprite texture.
    image: Option<PathBuf>,

    #[structopt(long, default_value = "640")]
    width: u32,

    #[structopt(long, default_value = "480")]
    height: u32,
  },

  /// Load a WAVE file on a worker pool and print its format.
  Sound {
    /// WAVE file to load.
    path: PathBuf,

    #[structopt(short, long)]
    /// Load as music, converting to 16-bit signed PCM if needed.
    music: bool,

    #[structopt(short, long, default_value = "2")]
    /// Number of loader threads.
    threads: usize,
  },
}

fn sprite_texture(
  ctx: &mut GLContext<TraceBackend>,
  image: Option<&PathBuf>,
) -> Result<TextureHandle, String> {
  let texture = ctx.create_texture(false, false).map_err(|e| e.to_string())?;

  match image {
    Some(path) => {
      let img = image::open(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?
        .to_rgba8();
      ctx.upload_image(texture, &img).map_err(|e| e.to_string())?;
    }

    None => {
      let texels = [255; 4 * 4 * 4];
      ctx
        .upload_texture(texture, [4, 4], &texels)
        .map_err(|e| e.to_string())?;
    }
  }

  Ok(texture)
}

fn scene(sprite: TextureHandle, width: u32, height: u32) -> Layer {
  let (w, h) = (width as f32, height as f32);

  let mut sprites = GroupLayer::new();
  for i in 0..4 {
    let x = 40. + 120. * i as f32;
    let layer = Layer::image(sprite, [64., 64.])
      .with_transform(translation(x, h * 0.5) * rotation(0.1 * i as f32))
      .with_depth(i as f32);

    sprites.add(layer);
  }

  let mut root = GroupLayer::new();
  root.add(Layer::solid([0.1, 0.1, 0.2, 1.], [w, h]).with_depth(-1.));
  root.add(Layer::group(sprites).with_alpha(0.8));
  root.add(
    Layer::solid([1., 0.5, 0., 1.], [w, 24.])
      .with_transform(translation(0., h - 24.))
      .with_alpha(0.5)
      .with_depth(10.),
  );

  Layer::group(root)
}

fn trace(frames: usize, image: Option<&PathBuf>, width: u32, height: u32) -> Result<(), String> {
  let opts = ContextOpt::default()
    .set_view_size([width, height])
    .set_background([0., 0., 0., 1.]);
  let mut ctx = GLContext::new(TraceBackend::new(), opts).map_err(|e: GraphicsError| e.to_string())?;

  let sprite = sprite_texture(&mut ctx, image)?;
  let root = scene(sprite, width, height);

  for frame in 0..frames {
    ctx.backend_mut().clear_calls();
    ctx.paint_layers(&root);

    println!("frame {}:", frame);
    for call in ctx.backend().calls() {
      match call {
        Call::DrawIndexed {
          program, indices, ..
        } => println!("  DrawIndexed({}, {} quads)", program, indices.len() / 6),
        call => println!("  {:?}", call),
      }
    }
  }

  ctx.destroy_texture(sprite).map_err(|e| e.to_string())?;
  ctx.dispose();

  Ok(())
}

fn sound(path: PathBuf, music: bool, threads: usize) -> Result<(), String> {
  let pool = WorkerPool::new(threads).map_err(|e| format!("cannot start workers: {}", e))?;
  let audio = Audio::new(Arc::new(pool), BufferMixer::new());

  let clip = audio.create_sound(FileResource::new(&path), music);

  match clip.wait() {
    Ok(clip) => {
      println!("{}", path.display());
      println!("  format: {}", clip.format());
      println!("  frames: {}", clip.frames());
      println!("  duration: {:.3}s", clip.duration().as_secs_f64());
      Ok(())
    }

    Err(e) => Err(format!("cannot load {}: {}", path.display(), e)),
  }
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  let result = match cli_opts.cmd {
    Command::Trace {
      frames,
      image,
      width,
      height,
    } => trace(frames, image.as_ref(), width, height),
    Command::Sound {
      path,
      music,
      threads,
    } => sound(path, music, threads),
  };

  if let Err(e) = result {
    log::error!("{}", e);
    process::exit(1);
  }
}
