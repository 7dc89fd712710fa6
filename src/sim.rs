// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Software model of the resampling accelerator and its two SGDMA engines.
//!
//! The three parts are wired with byte streams the same way the FPGA design
//! wires its Avalon-ST ports:
//!
//! ```text
//! memory -> (MM)SGDMA(ST) -> (ST)ACC_SCALE(ST) -> (ST)SGDMA(MM) -> memory
//! ```
//!
//! Each part runs on its own thread once started, so the orchestrator sees
//! the same asynchronous behaviour it gets from the real device. The engines
//! dereference the raw descriptor and buffer addresses they are given, which
//! is why [`TransferEngine::launch`] is unsafe.

use crate::{
    completion::CompletionNotifier,
    descriptor::{DescriptorChain, Transfer},
    device::{decode_control, launch_failure, Accelerator, TransferEngine},
    error::{Error, Result},
    traversal::{Direction, ScaleSpec},
};
use kanal::{Receiver, Sender};
use sgdma_sys::{
    SgdmaDescriptor, ACC_SCALE_CONTROL, ACC_SCALE_CONTROL_RESET, ACC_SCALE_CONTROL_START,
    ACC_SCALE_HEIGHT_0, ACC_SCALE_REGISTER_COUNT, ACC_SCALE_STATUS, ACC_SCALE_STATUS_BUSY,
    ACC_SCALE_WIDTH_0,
};
use std::{
    ptr, slice,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, trace, warn};

/// How long a stream read blocks before checking for cancellation.
const POLL: Duration = Duration::from_millis(2);

/// Builds a connected accelerator and engine pair.
///
/// Returns `(accelerator, mm2s, s2mm)`.
pub fn platform() -> (SimAccelerator, SimSgdma, SimSgdma) {
    let (feed_tx, feed_rx) = kanal::unbounded();
    let (drain_tx, drain_rx) = kanal::unbounded();
    (
        SimAccelerator::new(feed_rx, drain_tx, drain_rx.clone()),
        SimSgdma::new(Port::Source(feed_tx)),
        SimSgdma::new(Port::Sink(drain_rx)),
    )
}

fn flush(rx: &Receiver<Vec<u8>>) -> usize {
    let mut dropped = 0;
    while let Ok(Some(chunk)) = rx.try_recv() {
        dropped += chunk.len();
    }
    dropped
}

struct Worker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn spawn(name: &str, f: impl FnOnce(Arc<AtomicBool>) + Send + 'static) -> Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || f(flag))?;
        Ok(Self { cancel, handle })
    }

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    fn stop(self) {
        self.cancel.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            warn!("simulated device thread panicked");
        }
    }
}

/// Blocking reader over a chunked byte stream that gives up once cancelled.
struct StreamReader {
    rx: Receiver<Vec<u8>>,
    cancel: Arc<AtomicBool>,
    pending: Vec<u8>,
    pos: usize,
}

impl StreamReader {
    fn new(rx: Receiver<Vec<u8>>, cancel: Arc<AtomicBool>) -> Self {
        Self {
            rx,
            cancel,
            pending: Vec::new(),
            pos: 0,
        }
    }

    fn refill(&mut self) -> bool {
        loop {
            if self.cancel.load(Ordering::Acquire) {
                return false;
            }
            let polled = Instant::now();
            match self.rx.recv_timeout(POLL) {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.pos = 0;
                    return true;
                }
                // closed channels fail immediately
                Err(_) if polled.elapsed() < POLL => thread::sleep(POLL),
                Err(_) => {}
            }
        }
    }

    /// Fills `dst` completely. Returns false if cancelled first.
    fn read_exact(&mut self, dst: &mut [u8]) -> bool {
        let mut filled = 0;
        while filled < dst.len() {
            if self.pos == self.pending.len() && !self.refill() {
                return false;
            }
            let n = (dst.len() - filled).min(self.pending.len() - self.pos);
            dst[filled..filled + n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
            filled += n;
            self.pos += n;
        }
        true
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    width: u32,
    height: u32,
    scale: ScaleSpec,
}

/// Streams `frame.height` input rows through the resampler. Returns false if
/// cancelled or the output port is gone.
fn resample_stream(frame: Frame, input: &mut StreamReader, output: &Sender<Vec<u8>>) -> bool {
    let factor = usize::from(frame.scale.factor());
    let mut row = vec![0u8; frame.width as usize];

    for in_row in 0..frame.height as usize {
        if !input.read_exact(&mut row) {
            return false;
        }
        match frame.scale.direction() {
            Direction::Increase => {
                let out: Vec<u8> = row
                    .iter()
                    .flat_map(|&px| std::iter::repeat(px).take(factor))
                    .collect();
                for _ in 0..factor {
                    if output.send(out.clone()).is_err() {
                        return false;
                    }
                }
            }
            Direction::Decrease if in_row % factor == 0 => {
                let out: Vec<u8> = row.iter().step_by(factor).copied().collect();
                if output.send(out).is_err() {
                    return false;
                }
            }
            Direction::Decrease => {}
        }
    }
    true
}

/// Register-level model of the `acc_scale` resampler.
///
/// A control write with the start bit latches width, height, direction and
/// factor and starts a frame. Status reads [`ACC_SCALE_STATUS_BUSY`] until
/// the last output row has been pushed out.
pub struct SimAccelerator {
    registers: [u8; ACC_SCALE_REGISTER_COUNT],
    input: Receiver<Vec<u8>>,
    output: Sender<Vec<u8>>,
    output_flush: Receiver<Vec<u8>>,
    busy: Arc<AtomicBool>,
    worker: Option<Worker>,
    frames: u32,
}

impl SimAccelerator {
    fn new(input: Receiver<Vec<u8>>, output: Sender<Vec<u8>>, output_flush: Receiver<Vec<u8>>) -> Self {
        Self {
            registers: [0; ACC_SCALE_REGISTER_COUNT],
            input,
            output,
            output_flush,
            busy: Arc::new(AtomicBool::new(false)),
            worker: None,
            frames: 0,
        }
    }

    /// Number of frames started since creation.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    fn word(&self, first: u8) -> u32 {
        let at = usize::from(first);
        u32::from_le_bytes([
            self.registers[at],
            self.registers[at + 1],
            self.registers[at + 2],
            self.registers[at + 3],
        ])
    }

    fn start(&mut self) -> Result<()> {
        self.halt();

        let frame = Frame {
            width: self.word(ACC_SCALE_WIDTH_0),
            height: self.word(ACC_SCALE_HEIGHT_0),
            scale: decode_control(self.registers[usize::from(ACC_SCALE_CONTROL)])?,
        };
        debug!("acc_scale start {:?}", frame);

        let input = self.input.clone();
        let output = self.output.clone();
        let busy = self.busy.clone();
        busy.store(true, Ordering::Release);
        let worker = Worker::spawn("acc_scale", move |cancel| {
            let mut reader = StreamReader::new(input, cancel);
            if resample_stream(frame, &mut reader, &output) {
                trace!("acc_scale frame done");
            }
            busy.store(false, Ordering::Release);
        });
        match worker {
            Ok(w) => self.worker = Some(w),
            Err(e) => {
                self.busy.store(false, Ordering::Release);
                return Err(e);
            }
        }
        self.frames += 1;
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        self.busy.store(false, Ordering::Release);
        let stale = flush(&self.input) + flush(&self.output_flush);
        if stale > 0 {
            debug!("acc_scale dropped {} stale stream bytes", stale);
        }
    }
}

impl Accelerator for SimAccelerator {
    fn write_register(&mut self, offset: u8, value: u8) -> Result<()> {
        match offset {
            ACC_SCALE_STATUS => {
                warn!("acc_scale status register is read only");
                Ok(())
            }
            ACC_SCALE_CONTROL => {
                self.registers[usize::from(offset)] = value;
                if value & ACC_SCALE_CONTROL_RESET != 0 {
                    self.halt();
                    self.registers = [0; ACC_SCALE_REGISTER_COUNT];
                    Ok(())
                } else if value & ACC_SCALE_CONTROL_START != 0 {
                    self.start()
                } else {
                    Ok(())
                }
            }
            _ if usize::from(offset) < ACC_SCALE_REGISTER_COUNT => {
                self.registers[usize::from(offset)] = value;
                Ok(())
            }
            _ => Err(Error::InvalidRegister(offset)),
        }
    }

    fn read_register(&self, offset: u8) -> Result<u8> {
        match offset {
            ACC_SCALE_STATUS if self.busy.load(Ordering::Acquire) => Ok(ACC_SCALE_STATUS_BUSY),
            ACC_SCALE_STATUS => Ok(0),
            _ if usize::from(offset) < ACC_SCALE_REGISTER_COUNT => {
                Ok(self.registers[usize::from(offset)])
            }
            _ => Err(Error::InvalidRegister(offset)),
        }
    }
}

impl Drop for SimAccelerator {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Faults a [`SimSgdma`] can be told to inject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimFault {
    #[default]
    None,
    /// Refuse every launch.
    RejectLaunch,
    /// Move the data but never fire the completion notification.
    SilentCompletion,
}

enum Port {
    Source(Sender<Vec<u8>>),
    Sink(Receiver<Vec<u8>>),
}

/// Model of one SGDMA engine in park mode: descriptors are walked until the
/// first one not owned by hardware and are left untouched, so a chain can be
/// replayed.
pub struct SimSgdma {
    port: Port,
    fault: SimFault,
    worker: Option<Worker>,
    // held from launch until stop so the waiter never sees a closed channel
    notifier: Option<CompletionNotifier>,
    launches: u32,
}

/// Walks a memory-to-stream chain, pushing each descriptor's bytes.
///
/// # Safety
///
/// `head` must address a live descriptor chain whose buffers stay valid for
/// the whole walk.
unsafe fn read_chain(head: u64, port: &Sender<Vec<u8>>, cancel: &AtomicBool) -> bool {
    let mut addr = head;
    loop {
        if cancel.load(Ordering::Acquire) {
            return false;
        }
        let desc = ptr::read_volatile(addr as usize as *const SgdmaDescriptor);
        if !desc.owned_by_hw() {
            return true;
        }
        let data = slice::from_raw_parts(
            desc.read_addr as usize as *const u8,
            usize::from(desc.bytes_to_transfer),
        );
        if port.send(data.to_vec()).is_err() {
            return false;
        }
        addr = desc.next;
    }
}

/// Walks a stream-to-memory chain, filling each descriptor's buffer.
///
/// # Safety
///
/// `head` must address a live descriptor chain whose buffers stay valid and
/// unaliased for the whole walk.
unsafe fn write_chain(head: u64, port: &mut StreamReader) -> bool {
    let mut addr = head;
    loop {
        let desc = ptr::read_volatile(addr as usize as *const SgdmaDescriptor);
        if !desc.owned_by_hw() {
            return true;
        }
        let dst = slice::from_raw_parts_mut(
            desc.write_addr as usize as *mut u8,
            usize::from(desc.bytes_to_transfer),
        );
        if !port.read_exact(dst) {
            return false;
        }
        addr = desc.next;
    }
}

impl SimSgdma {
    fn new(port: Port) -> Self {
        Self {
            port,
            fault: SimFault::None,
            worker: None,
            notifier: None,
            launches: 0,
        }
    }

    pub fn with_fault(mut self, fault: SimFault) -> Self {
        self.fault = fault;
        self
    }

    pub fn transfer(&self) -> Transfer {
        match self.port {
            Port::Source(_) => Transfer::MemoryToStream,
            Port::Sink(_) => Transfer::StreamToMemory,
        }
    }

    /// Number of accepted launches since creation.
    pub fn launches(&self) -> u32 {
        self.launches
    }

    /// True while a launched chain is still being walked.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl TransferEngine for SimSgdma {
    unsafe fn launch(
        &mut self,
        chain: &DescriptorChain<'_>,
        done: CompletionNotifier,
    ) -> Result<()> {
        if chain.transfer() != self.transfer() {
            return Err(launch_failure(
                chain,
                format!("engine only handles {} chains", self.transfer()),
            ));
        }
        if self.fault == SimFault::RejectLaunch {
            return Err(launch_failure(chain, "injected fault"));
        }
        if !chain.head().owned_by_hw() {
            return Err(launch_failure(chain, "head descriptor not owned by hardware"));
        }
        if self.worker.is_some() {
            return Err(launch_failure(chain, "engine busy"));
        }

        let head = chain.head_addr();
        let notify = (self.fault != SimFault::SilentCompletion).then(|| done.clone());
        let worker = match &self.port {
            Port::Source(tx) => {
                let tx = tx.clone();
                Worker::spawn("sgdma_m2s", move |cancel| {
                    // SAFETY: the launch contract keeps the chain and its
                    // buffers alive until stop() has joined this thread.
                    if unsafe { read_chain(head, &tx, &cancel) } {
                        if let Some(done) = &notify {
                            done.notify();
                        }
                    }
                })?
            }
            Port::Sink(rx) => {
                let rx = rx.clone();
                Worker::spawn("sgdma_s2m", move |cancel| {
                    let mut reader = StreamReader::new(rx, cancel);
                    // SAFETY: as above; the destination image is mutably
                    // borrowed by the chain for the whole transfer.
                    if unsafe { write_chain(head, &mut reader) } {
                        if let Some(done) = &notify {
                            done.notify();
                        }
                    }
                })?
            }
        };

        debug!("{} launched, {} descriptors", self.transfer(), chain.count());
        self.worker = Some(worker);
        self.notifier = Some(done);
        self.launches += 1;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
            debug!("{} stopped", self.transfer());
        }
        self.notifier = None;
        if let Port::Sink(rx) = &self.port {
            flush(rx);
        }
    }
}

impl Drop for SimSgdma {
    fn drop(&mut self) {
        self.stop();
    }
}
