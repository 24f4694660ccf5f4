//! Job execution off the calling thread.
//!
//! Loading resources must not block the rendering thread. Backends hand such work to an
//! [`Exec`] as boxed closures; the closure is responsible for publishing its own result, usually
//! through a [`Resolver`](crate::deferred::Resolver).

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

/// A unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs jobs.
pub trait Exec: Send + Sync {
  /// Schedule a job. It runs at some point, possibly before this method returns.
  fn invoke_async(&self, job: Job);
}

/// Runs every job right away on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Exec for Immediate {
  fn invoke_async(&self, job: Job) {
    job();
  }
}

/// A fixed set of worker threads pulling jobs from a shared queue.
///
/// A job that panics is logged and doesn’t take its worker down. Dropping the pool lets the
/// workers finish every queued job, then joins them.
#[derive(Debug)]
pub struct WorkerPool {
  sender: Option<Sender<Job>>,
  workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
  /// Spawn `threads` workers (at least one).
  pub fn new(threads: usize) -> io::Result<Self> {
    let (sender, receiver) = unbounded::<Job>();
    let mut pool = WorkerPool {
      sender: Some(sender),
      workers: Vec::with_capacity(threads.max(1)),
    };

    for i in 0..threads.max(1) {
      let receiver = receiver.clone();
      let name = format!("lamina-worker-{}", i);
      let worker = thread::Builder::new()
        .name(name.clone())
        .spawn(move || run_worker(&name, receiver))?;

      pool.workers.push(worker);
    }

    log::debug!("worker pool started with {} threads", pool.workers.len());

    Ok(pool)
  }

  /// Number of worker threads.
  pub fn threads(&self) -> usize {
    self.workers.len()
  }
}

fn run_worker(name: &str, receiver: Receiver<Job>) {
  for job in receiver.iter() {
    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
      log::error!("job panicked on {}", name);
    }
  }

  log::trace!("{} exiting", name);
}

impl Exec for WorkerPool {
  fn invoke_async(&self, job: Job) {
    let sent = self.sender.as_ref().map(|sender| sender.send(job));

    if !matches!(sent, Some(Ok(()))) {
      log::error!("worker pool is shut down; job dropped");
    }
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    // closing the queue ends the workers once it’s drained
    self.sender.take();

    for worker in self.workers.drain(..) {
      if worker.join().is_err() {
        log::error!("worker thread panicked");
      }
    }
  }
}
