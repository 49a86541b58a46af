//! Background polling loop.
//!
//! One dedicated thread per open device turns the driver's blocking
//! short-timeout reads into asynchronous data deliveries. Bytes are
//! accumulated across iterations and flushed to the listener at most once
//! per buffering window, as an exactly-sized allocation. Shutdown is a
//! rendezvous: the stop flag is raised and the caller joins the thread, so
//! no delivery can happen after [`PollingLoop::stop`] returns.
//!
//! Both the read source and the listener are held weakly. A caller that
//! drops its listener does not leak it through the loop; the loop simply
//! stops delivering until stopped explicitly or given a new listener.

use crate::device::SerialDeviceListener;
use crate::error::Result;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Sleep between loop iterations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Minimum wall-clock time between two deliveries to the listener.
pub const POLL_BUFFER_WINDOW: Duration = Duration::from_millis(50);

/// Timeout of each short read issued by the loop.
const POLL_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Size of the loop's accumulation buffer.
const POLL_BUFFER_SIZE: usize = 16 * 1024;

/// Read capability the polling loop drives.
///
/// Implemented by the driver's shared I/O core. A timeout must surface as
/// `Ok(0)`, not as an error.
pub trait PollSource: Send + Sync {
    /// Read up to `dest.len()` bytes, returning 0 on timeout.
    fn poll_read(&self, dest: &mut [u8], timeout: Duration) -> Result<usize>;
}

type ListenerSlot = Arc<Mutex<Weak<dyn SerialDeviceListener>>>;

/// Handle to a running polling thread.
pub struct PollingLoop {
    run: Arc<AtomicBool>,
    listener: ListenerSlot,
    handle: Option<JoinHandle<()>>,
}

impl PollingLoop {
    /// Spawn the polling thread over the given source and listener.
    pub fn start(source: Weak<dyn PollSource>, listener: Weak<dyn SerialDeviceListener>) -> Self {
        let run = Arc::new(AtomicBool::new(true));
        let slot: ListenerSlot = Arc::new(Mutex::new(listener));

        let handle = {
            let run = Arc::clone(&run);
            let slot = Arc::clone(&slot);
            thread::spawn(move || poll_loop(&run, &source, &slot))
        };

        Self {
            run,
            listener: slot,
            handle: Some(handle),
        }
    }

    /// Swap the listener the loop delivers to.
    ///
    /// Atomic with respect to delivery: a chunk goes either entirely to the
    /// old listener or entirely to the new one.
    pub fn set_listener(&self, listener: &Arc<dyn SerialDeviceListener>) {
        *self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(listener);
    }

    /// Identifier of the polling thread, while it has not been joined.
    pub(crate) fn thread_id(&self) -> Option<thread::ThreadId> {
        self.handle.as_ref().map(|h| h.thread().id())
    }

    /// Stop the loop and join its thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.run.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            trace!("Stopping polling thread");
            if handle.join().is_err() {
                warn!("Polling thread panicked");
            }
        }
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    run: &AtomicBool,
    source: &Weak<dyn PollSource>,
    slot: &Mutex<Weak<dyn SerialDeviceListener>>,
) {
    let mut buf = vec![0u8; POLL_BUFFER_SIZE];
    let mut len = 0usize;
    let mut last_flush = Instant::now();

    while run.load(Ordering::Acquire) {
        if let Some(source) = source.upgrade() {
            match source.poll_read(&mut buf[len..], POLL_READ_TIMEOUT) {
                Ok(n) => len += n,
                // Transient read failures never terminate the loop.
                Err(e) => debug!("Polling read failed: {e}"),
            }
        }

        if last_flush.elapsed() >= POLL_BUFFER_WINDOW {
            if len > 0 {
                let data = buf[..len].to_vec();
                len = 0;
                let listener = slot
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .upgrade();
                if let Some(listener) = listener {
                    listener.on_data_read(&data);
                }
            }
            last_flush = Instant::now();
        }

        thread::sleep(POLL_INTERVAL);
    }
}
