// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Contracts for the hardware the orchestrator drives: the register-mapped
//! resampling accelerator and the two scatter-gather DMA engines feeding it.

use crate::{
    completion::CompletionNotifier,
    descriptor::DescriptorChain,
    error::{Error, Result},
    traversal::{Direction, ScaleSpec},
};
use sgdma_sys::{
    ACC_SCALE_CONTROL, ACC_SCALE_CONTROL_FACTOR_MASK, ACC_SCALE_CONTROL_INCREASE,
    ACC_SCALE_CONTROL_RESET, ACC_SCALE_CONTROL_START, ACC_SCALE_HEIGHT_0, ACC_SCALE_STATUS,
    ACC_SCALE_WIDTH_0,
};
use tracing::debug;

/// Control register value that starts a frame with `scale`.
pub fn control_word(scale: ScaleSpec) -> u8 {
    let direction = match scale.direction() {
        Direction::Increase => ACC_SCALE_CONTROL_INCREASE,
        Direction::Decrease => 0,
    };
    ACC_SCALE_CONTROL_START | direction | (scale.factor() & ACC_SCALE_CONTROL_FACTOR_MASK)
}

/// Decodes the scale fields of a control register value.
pub fn decode_control(control: u8) -> Result<ScaleSpec> {
    let direction = if control & ACC_SCALE_CONTROL_INCREASE != 0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    ScaleSpec::new(control & ACC_SCALE_CONTROL_FACTOR_MASK, direction)
}

/// Byte-addressed register file of the resampling accelerator.
///
/// Implementors only provide raw register access; the register layout is
/// applied by the provided methods.
pub trait Accelerator {
    /// Writes one byte-wide register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for offsets outside the register
    /// map.
    fn write_register(&mut self, offset: u8, value: u8) -> Result<()>;

    /// Reads one byte-wide register.
    fn read_register(&self, offset: u8) -> Result<u8>;

    /// Programs the frame geometry and starts the accelerator.
    ///
    /// Width and height are written least significant byte first, then the
    /// control byte carrying start, direction and factor.
    fn configure(&mut self, width: u32, height: u32, scale: ScaleSpec) -> Result<()> {
        for (offset, byte) in (ACC_SCALE_WIDTH_0..).zip(width.to_le_bytes()) {
            self.write_register(offset, byte)?;
        }
        for (offset, byte) in (ACC_SCALE_HEIGHT_0..).zip(height.to_le_bytes()) {
            self.write_register(offset, byte)?;
        }
        let control = control_word(scale);
        debug!("acc_scale {}x{} control {:#04x}", width, height, control);
        self.write_register(ACC_SCALE_CONTROL, control)
    }

    /// Aborts any frame in progress and returns the accelerator to idle.
    fn reset(&mut self) -> Result<()> {
        self.write_register(ACC_SCALE_CONTROL, ACC_SCALE_CONTROL_RESET)
    }

    fn status(&self) -> Result<u8> {
        self.read_register(ACC_SCALE_STATUS)
    }
}

/// One scatter-gather DMA engine.
pub trait TransferEngine {
    /// Starts walking `chain` from its head without blocking. `done` is
    /// notified once when the engine reaches the end of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LaunchFailure`] if the engine rejects the head
    /// descriptor.
    ///
    /// # Safety
    ///
    /// The engine accesses the descriptor table and the pixel memory it
    /// points at after this call returns. The caller must keep `chain`, and
    /// therefore the image it borrows, alive and untouched until
    /// [`TransferEngine::stop`] has returned.
    unsafe fn launch(&mut self, chain: &DescriptorChain<'_>, done: CompletionNotifier)
        -> Result<()>;

    /// Halts the engine. Once this returns the engine no longer touches any
    /// descriptor or buffer memory and is ready for a new launch.
    fn stop(&mut self);
}

/// Rejection helper for engine implementations.
pub fn launch_failure(chain: &DescriptorChain<'_>, reason: impl Into<String>) -> Error {
    Error::LaunchFailure {
        transfer: chain.transfer(),
        reason: reason.into(),
    }
}
