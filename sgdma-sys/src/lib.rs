// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Raw definitions shared by the scatter-gather DMA engines and the
//! `acc_scale` pixel resampling accelerator.
//!
//! Nothing in here performs I/O. The layouts and bit positions are dictated
//! by the hardware and must not be reordered.

#![no_std]

/// Size in bytes of one descriptor record. Descriptor tables must start on a
/// boundary of this size (the descriptor master is 256 bits wide).
pub const DESCRIPTOR_SIZE: usize = 32;

/// Largest byte count a single descriptor can carry (16-bit length field).
pub const DESCRIPTOR_BUFFER_LEN_MAX: u16 = u16::MAX;

/// Descriptor control: emit end-of-packet after this descriptor.
pub const DESCRIPTOR_CONTROL_GENERATE_EOP: u8 = 0x01;
/// Descriptor control: read from a fixed address.
pub const DESCRIPTOR_CONTROL_READ_FIXED_ADDRESS: u8 = 0x02;
/// Descriptor control: write to a fixed address.
pub const DESCRIPTOR_CONTROL_WRITE_FIXED_ADDRESS: u8 = 0x04;
/// Descriptor control: Avalon-ST channel number.
pub const DESCRIPTOR_CONTROL_ATLANTIC_CHANNEL_MASK: u8 = 0x78;
/// Descriptor control: the descriptor belongs to the hardware. A chain ends
/// at the first descriptor with this bit clear.
pub const DESCRIPTOR_CONTROL_OWNED_BY_HW: u8 = 0x80;

/// Descriptor status: the transfer was terminated by end-of-packet.
pub const DESCRIPTOR_STATUS_TERMINATED_BY_EOP: u8 = 0x80;

/// Engine control: global interrupt enable.
pub const SGDMA_CONTROL_IE_GLOBAL: u32 = 0x10;
/// Engine control: interrupt when a full chain completes.
pub const SGDMA_CONTROL_IE_CHAIN_COMPLETED: u32 = 0x08;
/// Engine control: leave descriptors owned by hardware once processed so
/// the same chain can be replayed.
pub const SGDMA_CONTROL_PARK: u32 = 0x20000;
/// Engine control: run.
pub const SGDMA_CONTROL_RUN: u32 = 0x20;

/// One scatter-gather descriptor as consumed by the SGDMA.
///
/// Addresses are kept 64 bits wide so host pointers fit; the device only
/// decodes the low 32 bits.
#[repr(C, align(32))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SgdmaDescriptor {
    pub read_addr: u64,
    pub write_addr: u64,
    pub next: u64,
    pub bytes_to_transfer: u16,
    pub read_burst: u8,
    pub write_burst: u8,
    pub actual_bytes_transferred: u16,
    pub status: u8,
    pub control: u8,
}

impl SgdmaDescriptor {
    /// Returns true while the descriptor is owned by the hardware.
    pub const fn owned_by_hw(&self) -> bool {
        self.control & DESCRIPTOR_CONTROL_OWNED_BY_HW != 0
    }
}

const _: () = assert!(core::mem::size_of::<SgdmaDescriptor>() == DESCRIPTOR_SIZE);
const _: () = assert!(core::mem::align_of::<SgdmaDescriptor>() == DESCRIPTOR_SIZE);

/// Accelerator register: image width, least significant byte first.
pub const ACC_SCALE_WIDTH_0: u8 = 0x0;
pub const ACC_SCALE_WIDTH_1: u8 = 0x1;
pub const ACC_SCALE_WIDTH_2: u8 = 0x2;
pub const ACC_SCALE_WIDTH_3: u8 = 0x3;
/// Accelerator register: image height, least significant byte first.
pub const ACC_SCALE_HEIGHT_0: u8 = 0x4;
pub const ACC_SCALE_HEIGHT_1: u8 = 0x5;
pub const ACC_SCALE_HEIGHT_2: u8 = 0x6;
pub const ACC_SCALE_HEIGHT_3: u8 = 0x7;
/// Accelerator register: status (read only).
pub const ACC_SCALE_STATUS: u8 = 0x8;
/// Accelerator register: control.
pub const ACC_SCALE_CONTROL: u8 = 0x9;
/// Number of byte-wide accelerator registers.
pub const ACC_SCALE_REGISTER_COUNT: usize = 10;

pub const ACC_SCALE_CONTROL_RESET: u8 = 0x80;
pub const ACC_SCALE_CONTROL_START: u8 = 0x40;
pub const ACC_SCALE_CONTROL_INCREASE: u8 = 0x20;
/// Scale factor lives in the low bits of the control register.
pub const ACC_SCALE_CONTROL_FACTOR_MASK: u8 = 0x07;

/// Status bit: a frame is being processed.
pub const ACC_SCALE_STATUS_BUSY: u8 = 0x01;
