//! Pointer chain resolution
//!
//! A chain is a base address and a non-empty list of offsets. The base is
//! dereferenced once, every offset but the last is added and dereferenced
//! again, and the last offset is added without a final dereference:
//!
//! ```text
//! addr = *base
//! addr = *(addr + offsets[0])
//! ...
//! addr = *(addr + offsets[n - 1])
//! result = addr + offsets[n]
//! ```
//!
//! Pointers are 4 bytes wide and zero-extended.

use super::MemoryAccessor;
use crate::core::types::{Address, MemoryError, MemoryResult};
use tracing::debug;

/// Follows pointer chains through a `MemoryAccessor`
#[derive(Clone)]
pub struct PointerResolver {
    memory: MemoryAccessor,
}

impl PointerResolver {
    pub fn new(memory: MemoryAccessor) -> Self {
        PointerResolver { memory }
    }

    /// Resolve a chain, reporting which dereference failed.
    ///
    /// Level 0 is the read at `base`, level `i + 1` the read through
    /// `offsets[i]`.
    pub fn try_resolve(&self, base: Address, offsets: &[i64]) -> MemoryResult<Address> {
        let (last, through) = offsets.split_last().ok_or_else(|| {
            MemoryError::invalid_argument("pointer chain needs at least one offset")
        })?;

        let mut address = self.dereference(base, 0)?;
        for (index, offset) in through.iter().enumerate() {
            address = self.dereference(address.offset(*offset), index + 1)?;
        }

        Ok(address.offset(*last))
    }

    /// Resolve a chain, yielding the null address if any dereference fails.
    ///
    /// An empty offset list is still rejected with `InvalidArgument`.
    pub fn resolve(&self, base: Address, offsets: &[i64]) -> MemoryResult<Address> {
        match self.try_resolve(base, offsets) {
            Ok(address) => Ok(address),
            Err(err @ MemoryError::InvalidArgument(_)) => Err(err),
            Err(err) => {
                debug!("pointer chain from {} resolved to null: {}", base, err);
                Ok(Address::null())
            }
        }
    }

    fn dereference(&self, at: Address, level: usize) -> MemoryResult<Address> {
        self.memory
            .try_read_pointer32(at)
            .map_err(|e| MemoryError::pointer_chain_broken(level, format!("{} ({})", at, e)))
    }
}
