// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide reachability signal.
//!
//! A `tokio::sync::watch` channel: one writer (the reachability probe),
//! many readers (the issuance form for attachment gating, the queue for
//! its send-vs-persist decision, the replayer for its wakeup). Passing
//! the receiver around explicitly -- rather than a global -- is what
//! keeps the queue testable without a real network.

use tokio::sync::watch;

use challan_core::types::Reachability;

/// Create the reachability channel with the given initial state.
///
/// Hosts start `Offline` and let the first probe tick flip the state;
/// tests pick whichever side the scenario needs.
pub fn reachability_channel(
    initial: Reachability,
) -> (watch::Sender<Reachability>, watch::Receiver<Reachability>) {
    watch::channel(initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_observe_writer_transitions() {
        let (tx, rx) = reachability_channel(Reachability::Offline);
        assert_eq!(*rx.borrow(), Reachability::Offline);

        tx.send(Reachability::Online).unwrap();
        assert_eq!(*rx.borrow(), Reachability::Online);
    }
}
