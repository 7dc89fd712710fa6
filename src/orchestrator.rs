// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    completion,
    descriptor::{DescriptorChain, Transfer},
    device::{Accelerator, TransferEngine},
    error::{Error, Result},
    image::ImageBuffer,
    traversal::ScaleSpec,
};
use sgdma_sys::DESCRIPTOR_BUFFER_LEN_MAX;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Progress of one hardware run.
///
/// ```text
/// Idle -> Configured -> Launched -> AwaitingBoth -> Completed -> Reset
/// ```
///
/// A run that fails after configuration still ends in `Reset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Configured,
    Launched,
    AwaitingBoth,
    Completed,
    Reset,
}

#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    /// Upper bound on the wait for both completion signals.
    pub timeout: Duration,
    /// Largest byte count placed in one descriptor.
    pub chunk_ceiling: u16,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            chunk_ceiling: DESCRIPTOR_BUFFER_LEN_MAX,
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("{:?} -> {:?}", state, next);
    *state = next;
}

/// Keeps an engine running for as long as it is alive and stops it on drop,
/// including on early returns and unwinding.
struct Running<'e, E: TransferEngine> {
    engine: &'e mut E,
}

impl<'e, E: TransferEngine> Running<'e, E> {
    /// # Safety
    ///
    /// `chain` must outlive the returned guard.
    unsafe fn launch(
        engine: &'e mut E,
        chain: &DescriptorChain<'_>,
        done: completion::CompletionNotifier,
    ) -> Result<Self> {
        engine.launch(chain, done)?;
        Ok(Self { engine })
    }
}

impl<E: TransferEngine> Drop for Running<'_, E> {
    fn drop(&mut self) {
        self.engine.stop();
    }
}

/// Drives one image through the accelerator using two concurrently running
/// SGDMA engines: `transmit` feeds the accelerator from memory, `receive`
/// drains its output back into memory.
///
/// # Example
///
/// ```
/// use acc_scale::{
///     image::ImageBuffer,
///     orchestrator::{Orchestrator, OrchestratorConfig},
///     sim,
///     traversal::{Direction, ScaleSpec},
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (acc, mm2s, s2mm) = sim::platform();
/// let mut orchestrator = Orchestrator::new(acc, mm2s, s2mm, OrchestratorConfig::default());
///
/// let input = ImageBuffer::from_fn(4, 4, |row, col| (row * 4 + col) as u8)?;
/// let mut output = ImageBuffer::new(8, 8)?;
/// orchestrator.run(&input, &mut output, ScaleSpec::new(2, Direction::Increase)?)?;
///
/// assert_eq!(output.row(0), &[0, 0, 1, 1, 2, 2, 3, 3]);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator<A, E> {
    accelerator: A,
    transmit: E,
    receive: E,
    config: OrchestratorConfig,
    state: RunState,
}

impl<A: Accelerator, E: TransferEngine> Orchestrator<A, E> {
    pub fn new(accelerator: A, transmit: E, receive: E, config: OrchestratorConfig) -> Self {
        Self {
            accelerator,
            transmit,
            receive,
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn accelerator(&self) -> &A {
        &self.accelerator
    }

    pub fn into_parts(self) -> (A, E, E) {
        (self.accelerator, self.transmit, self.receive)
    }

    /// Resamples `input` into `output` on the accelerator and returns the
    /// time spent between configuring the accelerator and stopping the
    /// engines.
    ///
    /// Both descriptor chains are built before the hardware is touched, so
    /// sizing and allocation failures leave the device idle.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `output` is not the shape `scale`
    ///   produces for `input`
    /// - [`Error::DescriptorCountOverflow`] or [`Error::AllocationFailure`]
    ///   while building either chain
    /// - [`Error::LaunchFailure`] if either engine rejects its chain
    /// - [`Error::Timeout`] if both completions do not arrive within
    ///   [`OrchestratorConfig::timeout`]
    #[instrument(skip_all, fields(input = %input, scale = %scale))]
    pub fn run(
        &mut self,
        input: &ImageBuffer,
        output: &mut ImageBuffer,
        scale: ScaleSpec,
    ) -> Result<Duration> {
        let expected = scale.output_dimensions(input.width(), input.height())?;
        if output.dimensions() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: output.dimensions(),
            });
        }

        let ceiling = self.config.chunk_ceiling;
        let tx_chain = DescriptorChain::memory_to_stream(input, ceiling)?;
        let rx_chain = DescriptorChain::stream_to_memory(output, ceiling)?;

        transition(&mut self.state, RunState::Idle);
        let started = Instant::now();
        let result = self.transfer(&tx_chain, &rx_chain, input.width(), input.height(), scale);
        let reset = self.accelerator.reset();
        transition(&mut self.state, RunState::Reset);
        result?;
        reset?;

        let elapsed = started.elapsed();
        info!(
            "hw path: {} + {} descriptors in {:?}",
            tx_chain.count(),
            rx_chain.count(),
            elapsed
        );
        Ok(elapsed)
    }

    fn transfer(
        &mut self,
        tx_chain: &DescriptorChain<'_>,
        rx_chain: &DescriptorChain<'_>,
        width: u32,
        height: u32,
        scale: ScaleSpec,
    ) -> Result<()> {
        self.accelerator.configure(width, height, scale)?;
        transition(&mut self.state, RunState::Configured);

        let (tx_done, mut tx_wait) = completion::channel(Transfer::MemoryToStream);
        let (rx_done, mut rx_wait) = completion::channel(Transfer::StreamToMemory);

        // SAFETY: both chains are borrowed for the whole call and both guards
        // are dropped, stopping their engines, before it returns.
        let transmit = unsafe { Running::launch(&mut self.transmit, tx_chain, tx_done) }?;
        let receive = unsafe { Running::launch(&mut self.receive, rx_chain, rx_done) }?;
        transition(&mut self.state, RunState::Launched);

        transition(&mut self.state, RunState::AwaitingBoth);
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        tx_wait.wait_until(deadline, started)?;
        debug!("the transmit SGDMA has completed");
        rx_wait.wait_until(deadline, started)?;
        debug!("the receive SGDMA has completed");
        transition(&mut self.state, RunState::Completed);

        tx_wait.reset();
        rx_wait.reset();
        drop(receive);
        drop(transmit);
        Ok(())
    }
}
