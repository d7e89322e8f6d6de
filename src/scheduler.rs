//! Shared per-frame driver.
//!
//! Every animated effect registers a callback under a key; the scheduler
//! holds exactly one frame request on its [`FrameClock`] while at least one
//! callback is registered and none while the registry is empty.
//!
//! Each tick snapshots the registry before invoking anything, so callbacks
//! may register or unregister (themselves or others) freely. Changes made
//! during a tick take effect from the next tick on.

use crate::clock::{FrameClock, FrameRequestId};
use fnv::FnvHashMap;
use rand::Rng;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Callback = Rc<RefCell<dyn FnMut(f64, f64) -> anyhow::Result<()>>>;

struct Entry {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct State {
    registry: FnvHashMap<String, Entry>,
    pending: Option<FrameRequestId>,
    last_timestamp: f64,
    in_tick: bool,
    next_entry_id: u64,
}

struct Inner<C: FrameClock> {
    clock: C,
    state: RefCell<State>,
}

impl<C: FrameClock> Drop for Inner<C> {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().pending.take() {
            self.clock.cancel_frame(id);
        }
    }
}

/// Cheaply clonable handle to one scheduler instance.
pub struct FrameScheduler<C: FrameClock + 'static> {
    inner: Rc<Inner<C>>,
}

impl<C: FrameClock + 'static> Clone for FrameScheduler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: FrameClock + 'static> std::fmt::Debug for FrameScheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("FrameScheduler")
            .field("active", &st.registry.len())
            .field("pending", &st.pending)
            .field("last_timestamp", &st.last_timestamp)
            .finish()
    }
}

impl<C: FrameClock + 'static> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            inner: Rc::new(Inner {
                clock,
                state: RefCell::new(State::default()),
            }),
        }
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    /// Registers `callback` under `key`, replacing any callback already
    /// registered under it. Starts the frame subscription if idle.
    ///
    /// The callback receives `(delta_ms, timestamp_ms)`. Returning an error
    /// (or panicking) is logged and does not affect other callbacks.
    pub fn register<F>(&self, key: impl Into<String>, callback: F)
    where
        F: FnMut(f64, f64) -> anyhow::Result<()> + 'static,
    {
        self.insert(key.into(), Rc::new(RefCell::new(callback)));
    }

    /// Scoped form of [`register`](Self::register): the callback stays
    /// registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> Registration<C>
    where
        F: FnMut(f64, f64) -> anyhow::Result<()> + 'static,
    {
        let key = key.into();
        let entry_id = self.insert(key.clone(), Rc::new(RefCell::new(callback)));
        Registration {
            scheduler: Rc::downgrade(&self.inner),
            key,
            entry_id,
        }
    }

    /// Removes the callback under `key`. Unknown keys are ignored.
    pub fn unregister(&self, key: &str) {
        self.remove(key, None);
    }

    pub fn active_count(&self) -> usize {
        self.inner.state.borrow().registry.len()
    }

    /// Whether the scheduler currently holds (or is servicing) a frame request.
    pub fn is_running(&self) -> bool {
        let st = self.inner.state.borrow();
        st.pending.is_some() || st.in_tick
    }

    fn insert(&self, key: String, callback: Callback) -> u64 {
        let (entry_id, replaced, start) = {
            let mut st = self.inner.state.borrow_mut();
            let entry_id = st.next_entry_id;
            st.next_entry_id += 1;
            let replaced = st.registry.insert(
                key,
                Entry {
                    id: entry_id,
                    callback,
                },
            );
            let start = st.pending.is_none() && !st.in_tick;
            (entry_id, replaced, start)
        };
        // Dropping a callback may run arbitrary destructors; keep it outside the borrow.
        drop(replaced);
        if start {
            self.start();
        }
        entry_id
    }

    fn remove(&self, key: &str, only_entry: Option<u64>) {
        let (removed, cancel) = {
            let mut st = self.inner.state.borrow_mut();
            let matches = match (st.registry.get(key), only_entry) {
                (Some(entry), Some(id)) => entry.id == id,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !matches {
                return;
            }
            let removed = st.registry.remove(key);
            let cancel = if st.registry.is_empty() {
                st.pending.take()
            } else {
                None
            };
            (removed, cancel)
        };
        if let Some(id) = cancel {
            log::debug!("frame scheduler idle; cancelling frame request");
            self.inner.clock.cancel_frame(id);
        }
        drop(removed);
    }

    fn start(&self) {
        let now = self.inner.clock.now();
        self.inner.state.borrow_mut().last_timestamp = now;
        log::debug!("frame scheduler starting at {now:.1}ms");
        self.request_next();
    }

    fn request_next(&self) {
        let weak = Rc::downgrade(&self.inner);
        let requested = self.inner.clock.request_frame(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                FrameScheduler { inner }.tick(timestamp);
            }
        }));
        match requested {
            Ok(id) => self.inner.state.borrow_mut().pending = Some(id),
            Err(e) => log::error!("frame scheduler could not request a frame: {e}"),
        }
    }

    fn tick(&self, timestamp: f64) {
        let (delta, batch) = {
            let mut st = self.inner.state.borrow_mut();
            st.pending = None;
            st.in_tick = true;
            let delta = (timestamp - st.last_timestamp).max(0.0);
            st.last_timestamp = timestamp;
            let batch: SmallVec<[(String, Callback); 16]> = st
                .registry
                .iter()
                .map(|(key, entry)| (key.clone(), entry.callback.clone()))
                .collect();
            (delta, batch)
        };

        for (key, callback) in &batch {
            invoke(key, callback, delta, timestamp);
        }
        drop(batch);

        let resume = {
            let mut st = self.inner.state.borrow_mut();
            st.in_tick = false;
            !st.registry.is_empty() && st.pending.is_none()
        };
        if resume {
            self.request_next();
        } else {
            log::debug!("frame scheduler stopped after tick at {timestamp:.1}ms");
        }
    }
}

fn invoke(key: &str, callback: &Callback, delta: f64, timestamp: f64) {
    let Ok(mut f) = callback.try_borrow_mut() else {
        log::warn!("frame callback '{key}' is already running; skipped");
        return;
    };
    match panic::catch_unwind(AssertUnwindSafe(|| (&mut *f)(delta, timestamp))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("frame callback '{key}' failed: {e:#}"),
        Err(_) => log::warn!("frame callback '{key}' panicked"),
    }
}

/// Keeps a callback registered for as long as it is alive.
///
/// Dropping the guard unregisters the key, unless the key has since been
/// re-registered by someone else.
#[must_use = "dropping a Registration unregisters its callback immediately"]
pub struct Registration<C: FrameClock + 'static> {
    scheduler: Weak<Inner<C>>,
    key: String,
    entry_id: u64,
}

impl<C: FrameClock + 'static> Registration<C> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<C: FrameClock + 'static> std::fmt::Debug for Registration<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .finish()
    }
}

impl<C: FrameClock + 'static> Drop for Registration<C> {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade() {
            FrameScheduler { inner }.remove(&self.key, Some(self.entry_id));
        }
    }
}

/// Builds a registry key of the form `prefix-xxxxxxxx` with a random suffix.
pub fn unique_key(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{prefix}-{suffix:08x}")
}
