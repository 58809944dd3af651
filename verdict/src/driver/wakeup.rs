//! Wakeup channel between finished jobs and [`Driver::settle`](super::Driver::settle).
//!
//! Each spawned job sends one signal when its output becomes available, so a
//! waiting driver can step again instead of polling.

use tokio::sync::mpsc;

/// Sender half of the wakeup channel.
#[derive(Clone)]
pub(crate) struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Send a wakeup signal.
    ///
    /// Non-blocking. A full buffer already guarantees a wakeup, and a dropped
    /// receiver means nobody is waiting, so errors are ignored.
    pub(crate) fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wakeup channel.
pub(crate) struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Wait for a wakeup signal, then swallow any others already queued.
    pub(crate) async fn recv(&mut self) -> Option<()> {
        let signal = self.rx.recv().await;
        while self.rx.try_recv().is_ok() {}
        signal
    }
}

/// Create a new wakeup channel pair.
pub(crate) fn channel() -> (WakeupSender, WakeupReceiver) {
    // Small buffer: one pending signal is enough to wake the driver
    let (tx, rx) = mpsc::channel(16);
    (WakeupSender { tx }, WakeupReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signals_coalesce() {
        let (tx, mut rx) = channel();
        for _ in 0..40 {
            tx.send();
        }

        assert_eq!(rx.recv().await, Some(()));
        assert!(rx.rx.try_recv().is_err());
    }
}
