//! Change notification for the plan document.
//!
//! ## Architecture
//!
//! - [`Debouncer`] is the two-state (idle / pending) quiet-period machine
//! - [`run_debounce_loop`] drives it from a channel of raw change signals
//! - [`ListenerRegistry`] fans a coalesced event out to every subscriber
//! - [`watch_document`] connects a `notify` watcher to the loop
//!
//! The watcher observes the document's directory rather than the file itself,
//! so atomic rename-based saves (ours and most editors') keep being seen.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::stream::{self, Stream};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::events::ChangeEvent;

/// Default quiet period before a burst of changes is broadcast.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 500;

/// Per-listener queue depth; events beyond it are dropped for that listener.
const LISTENER_BUFFER: usize = 64;

/// How long the loop sleeps while idle before re-checking the channel.
const IDLE_WAIT: Duration = Duration::from_secs(3600);

// ============================================================================
// Debounce state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { deadline: Instant },
}

/// Coalesces raw change signals into one notification per quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Record a raw signal: start or restart the quiet-period timer.
    pub fn signal(&mut self, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.quiet,
        };
    }

    /// Return to idle and report `true` if the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// How long to wait for the next signal before calling [`Debouncer::fire`].
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.state {
            DebounceState::Idle => IDLE_WAIT,
            DebounceState::Pending { deadline } => deadline.saturating_duration_since(now),
        }
    }
}

/// Drive a [`Debouncer`] from `signals` until the sending side hangs up.
///
/// `on_quiet` runs once per coalesced burst. A burst still pending when the
/// channel closes is discarded.
pub fn run_debounce_loop<T>(signals: Receiver<T>, quiet: Duration, mut on_quiet: impl FnMut()) {
    let mut debouncer = Debouncer::new(quiet);
    loop {
        match signals.recv_timeout(debouncer.wait_time(Instant::now())) {
            Ok(_) => debouncer.signal(Instant::now()),
            Err(RecvTimeoutError::Timeout) => {
                if debouncer.fire(Instant::now()) {
                    on_quiet();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

// ============================================================================
// Listener registry
// ============================================================================

#[derive(Debug, Clone)]
struct Listener {
    id: u64,
    tx: tokio_mpsc::Sender<ChangeEvent>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
    last_timestamp: AtomicI64,
}

/// Process-wide set of change listeners.
///
/// Broadcasts iterate a snapshot of the list, so subscribe and unsubscribe
/// never wait on delivery and never mutate the list being iterated.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Its first event is [`ChangeEvent::Connected`].
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = tokio_mpsc::channel(LISTENER_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let _ = tx.try_send(ChangeEvent::Connected);

        let count = {
            let mut listeners = self.listeners();
            listeners.push(Listener { id, tx });
            listeners.len()
        };
        info!(listener = id, listeners = count, "listener connected");

        Subscription {
            id,
            rx,
            registry: self.clone(),
        }
    }

    fn unsubscribe(&self, id: u64) {
        let count = {
            let mut listeners = self.listeners();
            listeners.retain(|listener| listener.id != id);
            listeners.len()
        };
        info!(listener = id, listeners = count, "listener disconnected");
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send a `file-changed` event to every current listener.
    ///
    /// Returns how many listeners accepted it. Full or closed listeners are
    /// skipped, not retried or evicted.
    pub fn broadcast(&self, file: &str) -> usize {
        let event = ChangeEvent::FileChanged {
            file: file.to_string(),
            timestamp: self.next_timestamp(),
        };
        let snapshot = self.listeners().clone();
        let delivered = snapshot
            .iter()
            .filter(|listener| listener.tx.try_send(event.clone()).is_ok())
            .count();
        info!(
            file,
            delivered,
            listeners = snapshot.len(),
            "broadcast file change"
        );
        delivered
    }

    /// Wall-clock millis, bumped so consecutive events never share or reuse one.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.inner.last_timestamp.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.inner.last_timestamp.compare_exchange(
                last,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A registered listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: tokio_mpsc::Receiver<ChangeEvent>,
    registry: ListenerRegistry,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Wait for the next event from synchronous code (outside a runtime).
    pub fn blocking_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.blocking_recv()
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }

    /// Turn the subscription into a stream; dropping the stream unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}

// ============================================================================
// File watcher
// ============================================================================

/// Live watcher on the plan document. Dropping it stops notifications.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl DocumentWatcher {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Watch `path` and broadcast to `registry` after each quiet period.
pub fn watch_document(
    path: &Path,
    quiet: Duration,
    registry: ListenerRegistry,
) -> Result<DocumentWatcher> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidArgument(format!("not a file path: {}", path.display())))?
        .to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (signal_tx, signal_rx) = mpsc::channel::<()>();
    let target = file_name.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                if touches_file(&event, &target) {
                    debug!(kind = ?event.kind, "raw document change");
                    let _ = signal_tx.send(());
                }
            }
            Err(err) => warn!(error = %err, "file watcher error"),
        }
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    let label = display_name(&file_name);
    thread::Builder::new()
        .name("planboard-watch".to_string())
        .spawn(move || {
            run_debounce_loop(signal_rx, quiet, || {
                info!(file = %label, "plan document changed");
                registry.broadcast(&label);
            });
            debug!("watch loop stopped");
        })?;

    info!(
        path = %path.display(),
        quiet_ms = quiet.as_millis() as u64,
        "watching plan document for changes"
    );
    Ok(DocumentWatcher {
        _watcher: watcher,
        path: path.to_path_buf(),
    })
}

fn touches_file(event: &notify::Event, file_name: &OsStr) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

fn display_name(file_name: &OsString) -> String {
    file_name.to_string_lossy().into_owned()
}
