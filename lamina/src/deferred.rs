//! Single-resolution results.
//!
//! [`deferred`] creates a connected pair: a [`Resolver`], handed to whatever produces the result,
//! and a [`Deferred`], handed to whoever waits for it. The resolver is consumed by resolving, so
//! a result is published at most once. Observers can poll the [`State`], block until the result
//! is there, or register continuations.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

type Listener<T, E> = Box<dyn FnOnce(&Result<T, E>) + Send + 'static>;

struct Shared<T, E> {
  result: OnceLock<Result<T, E>>,
  // guards registration against resolution
  listeners: Mutex<Vec<Listener<T, E>>>,
  resolved: Condvar,
}

impl<T, E> Shared<T, E> {
  fn listeners(&self) -> MutexGuard<Vec<Listener<T, E>>> {
    self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Create a pending result along with its resolver.
pub fn deferred<T, E>() -> (Resolver<T, E>, Deferred<T, E>) {
  let shared = Arc::new(Shared {
    result: OnceLock::new(),
    listeners: Mutex::new(Vec::new()),
    resolved: Condvar::new(),
  });

  let resolver = Resolver {
    shared: Some(shared.clone()),
  };

  (resolver, Deferred { shared })
}

/// Where a deferred result stands.
#[derive(Debug, Eq, PartialEq)]
pub enum State<'a, T, E> {
  Pending,
  Succeeded(&'a T),
  Failed(&'a E),
}

/// The producing side.
pub struct Resolver<T, E> {
  shared: Option<Arc<Shared<T, E>>>,
}

impl<T, E> Resolver<T, E> {
  /// Publish the result, wake every waiter and run every continuation on this thread.
  pub fn complete(mut self, result: Result<T, E>) {
    let shared = match self.shared.take() {
      Some(shared) => shared,
      None => return,
    };

    let listeners = {
      let mut listeners = shared.listeners();

      if shared.result.set(result).is_err() {
        log::error!("deferred result resolved twice; keeping the first one");
      }

      mem::take(&mut *listeners)
    };

    shared.resolved.notify_all();

    if let Some(result) = shared.result.get() {
      for listener in listeners {
        listener(result);
      }
    }
  }

  pub fn succeed(self, value: T) {
    self.complete(Ok(value));
  }

  pub fn fail(self, error: E) {
    self.complete(Err(error));
  }
}

impl<T, E> Drop for Resolver<T, E> {
  fn drop(&mut self) {
    if self.shared.is_some() {
      log::warn!("resolver dropped without resolving; its deferred stays pending");
    }
  }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Resolver")
      .field("armed", &self.shared.is_some())
      .finish()
  }
}

/// The observing side. Clones observe the same result.
pub struct Deferred<T, E> {
  shared: Arc<Shared<T, E>>,
}

impl<T, E> Deferred<T, E> {
  /// A deferred that is already resolved.
  pub fn resolved(result: Result<T, E>) -> Self {
    let (resolver, deferred) = deferred();
    resolver.complete(result);
    deferred
  }

  pub fn state(&self) -> State<T, E> {
    match self.shared.result.get() {
      None => State::Pending,
      Some(Ok(value)) => State::Succeeded(value),
      Some(Err(error)) => State::Failed(error),
    }
  }

  pub fn is_complete(&self) -> bool {
    self.shared.result.get().is_some()
  }

  /// The result, if resolved.
  pub fn result(&self) -> Option<&Result<T, E>> {
    self.shared.result.get()
  }

  /// Block until resolved.
  pub fn wait(&self) -> &Result<T, E> {
    let mut guard = self.shared.listeners();

    loop {
      if let Some(result) = self.shared.result.get() {
        return result;
      }

      guard = self
        .shared
        .resolved
        .wait(guard)
        .unwrap_or_else(PoisonError::into_inner);
    }
  }

  /// Block until resolved or until `timeout` elapses.
  pub fn wait_timeout(&self, timeout: Duration) -> Option<&Result<T, E>> {
    let deadline = Instant::now() + timeout;
    let mut guard = self.shared.listeners();

    loop {
      if let Some(result) = self.shared.result.get() {
        return Some(result);
      }

      let now = Instant::now();
      if now >= deadline {
        return None;
      }

      guard = self
        .shared
        .resolved
        .wait_timeout(guard, deadline - now)
        .unwrap_or_else(PoisonError::into_inner)
        .0;
    }
  }

  /// Run `f` with the result once resolved.
  ///
  /// If the result is already there, `f` runs right away on this thread; otherwise it runs on
  /// the resolving thread.
  pub fn on_complete<F>(&self, f: F)
  where
    F: FnOnce(&Result<T, E>) + Send + 'static,
  {
    let mut listeners = self.shared.listeners();

    match self.shared.result.get() {
      Some(result) => {
        drop(listeners);
        f(result);
      }

      None => listeners.push(Box::new(f)),
    }
  }
}

impl<T, E> Clone for Deferred<T, E> {
  fn clone(&self) -> Self {
    Deferred {
      shared: self.shared.clone(),
    }
  }
}

impl<T, E> fmt::Debug for Deferred<T, E>
where
  T: fmt::Debug,
  E: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_tuple("Deferred").field(&self.state()).finish()
  }
}
