//! Fixed-period tick source.
//!
//! A dedicated OS thread sends a unit [`Tick`] over an mpsc channel every
//! [`TICK_MS`] milliseconds, so tick delivery degrades gracefully under
//! load on the consuming side instead of stalling with it. Ticks carry no
//! payload and missed ticks are never replayed -- catch-up after a long
//! gap is the recovery engine's job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Nominal tick period in milliseconds.
pub const TICK_MS: u64 = 10;

/// A heartbeat notification: "~10ms elapsed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Background tick source.
///
/// `start` on a started ticker and `stop` on a stopped ticker are no-ops.
pub struct Ticker {
    tx: Sender<Tick>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Create a ticker and the receiving end of its tick channel.
    pub fn new() -> (Self, Receiver<Tick>) {
        let (tx, rx) = channel();
        (
            Self {
                tx,
                running: Arc::new(AtomicBool::new(false)),
                handle: None,
            },
            rx,
        )
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the tick thread. No-op if already started.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        self.running.store(true, Ordering::SeqCst);
        let tx = self.tx.clone();
        let running = Arc::clone(&self.running);
        self.handle = Some(std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(TICK_MS));
                if tx.send(Tick).is_err() {
                    // Receiver dropped.
                    break;
                }
            }
        }));
    }

    /// Stop the tick thread. No-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.running.store(false, Ordering::SeqCst);
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
