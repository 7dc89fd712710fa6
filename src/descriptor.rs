// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Scatter-gather descriptor chains describing an image to the SGDMA.
//!
//! Each image row is its own allocation, so every row contributes one or
//! more descriptors of at most the chunk ceiling. Descriptors are laid out
//! in row-major, left-to-right order and linked through their `next` field.
//! The slot after the last descriptor is left zeroed: the engines stop at the
//! first descriptor that is not owned by hardware.

use crate::{
    error::{Error, Result},
    image::ImageBuffer,
    traversal::{chunks_per_row, RowChunks},
};
use core::fmt;
use sgdma_sys::{SgdmaDescriptor, DESCRIPTOR_CONTROL_OWNED_BY_HW, DESCRIPTOR_SIZE};
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Descriptor slots allocated beyond the live descriptors: the zeroed
/// terminal slot plus one spare.
const TABLE_SLACK: u32 = 2;

/// Direction of one SGDMA transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transfer {
    /// Avalon-MM memory into the accelerator's input stream.
    MemoryToStream,
    /// The accelerator's output stream into Avalon-MM memory.
    StreamToMemory,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Transfer::MemoryToStream => write!(f, "mm2s"),
            Transfer::StreamToMemory => write!(f, "s2mm"),
        }
    }
}

/// Overflow-checked arithmetic for descriptor table sizing. Every step of
/// the sizing goes through here so a 32-bit overflow always surfaces as
/// [`Error::DescriptorCountOverflow`].
struct Sizing {
    width: u32,
    height: u32,
}

impl Sizing {
    fn checked(&self, value: Option<u32>) -> Result<u32> {
        value.ok_or(Error::DescriptorCountOverflow {
            width: self.width,
            height: self.height,
        })
    }

    fn mul(&self, a: u32, b: u32) -> Result<u32> {
        self.checked(a.checked_mul(b))
    }

    fn add(&self, a: u32, b: u32) -> Result<u32> {
        self.checked(a.checked_add(b))
    }
}

/// Sizing of a descriptor chain, computed before anything is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainPlan {
    pub width: u32,
    pub height: u32,
    pub ceiling: u16,
    /// Descriptors needed for one row.
    pub chunks_per_row: u32,
    /// Live descriptors in the chain.
    pub count: u32,
    /// Bytes requested for the descriptor table.
    pub table_bytes: u32,
}

impl ChainPlan {
    /// Sizes a chain for a `width` x `height` image cut into chunks of at
    /// most `ceiling` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DescriptorCountOverflow`] if the descriptor count or
    /// the table size does not fit in 32 bits.
    pub fn new(width: u32, height: u32, ceiling: u16) -> Result<Self> {
        let sizing = Sizing { width, height };
        let chunks_per_row = chunks_per_row(width, ceiling);
        let count = sizing.mul(height, chunks_per_row)?;
        let slots = sizing.add(count, TABLE_SLACK)?;
        let table_bytes = sizing.mul(slots, DESCRIPTOR_SIZE as u32)?;

        Ok(Self {
            width,
            height,
            ceiling,
            chunks_per_row,
            count,
            table_bytes,
        })
    }

    /// Number of descriptor records in the table.
    pub fn slots(&self) -> usize {
        (self.count + TABLE_SLACK) as usize
    }
}

fn mem_to_stream_desc(read_addr: u64, next: u64, len: u16) -> SgdmaDescriptor {
    SgdmaDescriptor {
        read_addr,
        next,
        bytes_to_transfer: len,
        control: DESCRIPTOR_CONTROL_OWNED_BY_HW,
        ..Default::default()
    }
}

fn stream_to_mem_desc(write_addr: u64, next: u64, len: u16) -> SgdmaDescriptor {
    SgdmaDescriptor {
        write_addr,
        next,
        bytes_to_transfer: len,
        control: DESCRIPTOR_CONTROL_OWNED_BY_HW,
        ..Default::default()
    }
}

/// A linked descriptor table covering one image.
///
/// The table is a single allocation of 32-byte aligned records and is
/// released when the chain is dropped. The chain borrows the image it
/// describes for `'a`, so the pixel memory the descriptors point at cannot
/// move or be freed while the chain exists.
pub struct DescriptorChain<'a> {
    transfer: Transfer,
    plan: ChainPlan,
    table: Vec<SgdmaDescriptor>,
    _image: PhantomData<&'a mut [u8]>,
}

impl<'a> DescriptorChain<'a> {
    /// Builds the chain the memory-to-stream engine reads `source` through.
    pub fn memory_to_stream(source: &'a ImageBuffer, ceiling: u16) -> Result<Self> {
        Self::build(
            Transfer::MemoryToStream,
            source.width(),
            source.height(),
            ceiling,
            |row| source.row(row).as_ptr() as u64,
        )
    }

    /// Builds the chain the stream-to-memory engine writes `destination`
    /// through.
    pub fn stream_to_memory(destination: &'a mut ImageBuffer, ceiling: u16) -> Result<Self> {
        let (width, height) = destination.dimensions();
        Self::build(
            Transfer::StreamToMemory,
            width,
            height,
            ceiling,
            |row| destination.row_mut(row).as_mut_ptr() as u64,
        )
    }

    #[instrument(skip(row_addr))]
    fn build(
        transfer: Transfer,
        width: u32,
        height: u32,
        ceiling: u16,
        mut row_addr: impl FnMut(u32) -> u64,
    ) -> Result<Self> {
        let plan = ChainPlan::new(width, height, ceiling)?;

        let mut table = Vec::new();
        table
            .try_reserve_exact(plan.slots())
            .map_err(|_| Error::AllocationFailure {
                bytes: plan.table_bytes as usize,
            })?;
        table.resize(plan.slots(), SgdmaDescriptor::default());

        // terminal slot, must never look owned by hardware
        table[plan.count as usize].control = 0;

        let base = table.as_ptr() as u64;
        debug_assert_eq!(base % DESCRIPTOR_SIZE as u64, 0);

        let mut index = 0usize;
        for row in 0..height {
            let row_base = row_addr(row);
            for chunk in RowChunks::new(width, ceiling) {
                let next = base + ((index + 1) * DESCRIPTOR_SIZE) as u64;
                let buffer = row_base + u64::from(chunk.offset);
                table[index] = match transfer {
                    Transfer::MemoryToStream => mem_to_stream_desc(buffer, next, chunk.len),
                    Transfer::StreamToMemory => stream_to_mem_desc(buffer, next, chunk.len),
                };
                index += 1;
            }
        }
        debug_assert_eq!(index, plan.count as usize);

        debug!(
            "{} chain: {} descriptors, {} per row, {} table bytes",
            transfer, plan.count, plan.chunks_per_row, plan.table_bytes
        );

        Ok(Self {
            transfer,
            plan,
            table,
            _image: PhantomData,
        })
    }

    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    pub fn plan(&self) -> &ChainPlan {
        &self.plan
    }

    /// Number of live descriptors.
    pub fn count(&self) -> u32 {
        self.plan.count
    }

    /// Live descriptors in chain order.
    pub fn descriptors(&self) -> &[SgdmaDescriptor] {
        &self.table[..self.plan.count as usize]
    }

    /// First descriptor, handed to the engine to start a transfer.
    pub fn head(&self) -> &SgdmaDescriptor {
        &self.table[0]
    }

    /// Address of the first descriptor as seen by the engine.
    pub fn head_addr(&self) -> u64 {
        self.table.as_ptr() as u64
    }

    /// Follows the `next` links from the head the way the engine does,
    /// stopping at the first descriptor not owned by hardware.
    pub fn links(&self) -> impl Iterator<Item = &SgdmaDescriptor> + '_ {
        let base = self.head_addr();
        let mut index = Some(0usize);
        std::iter::from_fn(move || {
            let desc = self.table.get(index?)?;
            if !desc.owned_by_hw() {
                index = None;
                return None;
            }
            index = desc
                .next
                .checked_sub(base)
                .map(|offset| offset as usize / DESCRIPTOR_SIZE);
            Some(desc)
        })
    }
}

impl fmt::Debug for DescriptorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DescriptorChain")
            .field("transfer", &self.transfer)
            .field("plan", &self.plan)
            .field("head", &format_args!("{:#x}", self.head_addr()))
            .finish()
    }
}
