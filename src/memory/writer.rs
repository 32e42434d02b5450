//! Writing fixed-width values into the attached process

use super::MemoryAccessor;
use crate::core::types::{Address, MemoryError, MemoryResult};
use tracing::debug;

impl MemoryAccessor {
    /// Write all of `data` at `address`; short writes are failures
    pub fn try_write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let written = self.process.with_memory(|m| m.write(address, data))?;
        if written != data.len() {
            return Err(MemoryError::PartialWrite {
                address: address.to_string(),
                expected: data.len(),
                actual: written,
            });
        }
        Ok(())
    }

    pub fn try_write_int32(&self, address: Address, value: i32) -> MemoryResult<()> {
        self.try_write_bytes(address, &value.to_ne_bytes())
    }

    pub fn try_write_float32(&self, address: Address, value: f32) -> MemoryResult<()> {
        self.try_write_bytes(address, &value.to_ne_bytes())
    }

    pub fn try_write_byte(&self, address: Address, value: u8) -> MemoryResult<()> {
        self.try_write_bytes(address, &[value])
    }

    /// Write an `i32`; failures are silently skipped
    pub fn write_int32(&self, address: Address, value: i32) {
        skip_on_failure(self.try_write_int32(address, value));
    }

    /// Write an `f32`; failures are silently skipped
    pub fn write_float32(&self, address: Address, value: f32) {
        skip_on_failure(self.try_write_float32(address, value));
    }

    /// Write a byte; failures are silently skipped
    pub fn write_byte(&self, address: Address, value: u8) {
        skip_on_failure(self.try_write_byte(address, value));
    }
}

fn skip_on_failure(result: MemoryResult<()>) {
    if let Err(e) = result {
        debug!("write skipped: {}", e);
    }
}
