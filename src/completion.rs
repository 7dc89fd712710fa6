// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Completion signalling between a transfer engine and the orchestrator.
//!
//! Each transfer gets one notifier (held by the engine, fired once per
//! completed chain) and one waiter (held by the orchestrator). The waiter
//! keeps a running count that only grows until [`CompletionWaiter::reset`].

use crate::{
    descriptor::Transfer,
    error::{Error, Result},
};
use std::time::{Duration, Instant};
use tracing::trace;

/// Creates a linked notifier/waiter pair for one transfer direction.
pub fn channel(transfer: Transfer) -> (CompletionNotifier, CompletionWaiter) {
    let (tx, rx) = kanal::unbounded();
    (
        CompletionNotifier { transfer, tx },
        CompletionWaiter {
            transfer,
            rx,
            count: 0,
        },
    )
}

/// Producer side, owned by the transfer engine.
#[derive(Clone)]
pub struct CompletionNotifier {
    transfer: Transfer,
    tx: kanal::Sender<()>,
}

impl CompletionNotifier {
    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    /// Records one completed chain. Dropped waiters are ignored.
    pub fn notify(&self) {
        trace!("{} chain completed", self.transfer);
        let _ = self.tx.send(());
    }
}

/// Consumer side, owned by the orchestrator.
pub struct CompletionWaiter {
    transfer: Transfer,
    rx: kanal::Receiver<()>,
    count: u32,
}

impl CompletionWaiter {
    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    fn drain(&mut self) {
        while let Ok(Some(())) = self.rx.try_recv() {
            self.count = self.count.saturating_add(1);
        }
    }

    /// Completions seen since the last reset, without blocking.
    pub fn count(&mut self) -> u32 {
        self.drain();
        self.count
    }

    /// Blocks until at least one completion has been registered or
    /// `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when the deadline passes first and
    /// [`Error::Disconnected`] if every notifier was dropped without firing.
    pub fn wait_until(&mut self, deadline: Instant, started: Instant) -> Result<u32> {
        if self.count() > 0 {
            return Ok(self.count);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(()) => {
                self.count = self.count.saturating_add(1);
                self.drain();
                Ok(self.count)
            }
            Err(_) if Instant::now() >= deadline => Err(Error::Timeout {
                transfer: self.transfer,
                waited: started.elapsed(),
            }),
            Err(_) => Err(Error::Disconnected {
                transfer: self.transfer,
            }),
        }
    }

    /// Blocks for at most `timeout`; see [`CompletionWaiter::wait_until`].
    pub fn wait(&mut self, timeout: Duration) -> Result<u32> {
        let started = Instant::now();
        self.wait_until(started + timeout, started)
    }

    /// Consumes all registered completions.
    pub fn reset(&mut self) {
        self.drain();
        self.count = 0;
    }
}
