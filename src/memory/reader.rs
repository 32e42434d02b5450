//! Reading fixed-width values from the attached process

use super::MemoryAccessor;
use crate::core::types::{Address, MemoryError, MemoryResult};
use tracing::debug;

impl MemoryAccessor {
    /// Fill `buffer` from `address`; short reads are failures
    pub fn try_read_exact(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let read = self.process.with_memory(|m| m.read(address, buffer))?;
        if read != buffer.len() {
            return Err(MemoryError::PartialRead {
                address: address.to_string(),
                expected: buffer.len(),
                actual: read,
            });
        }
        Ok(())
    }

    /// Read `size` raw bytes
    pub fn try_read_bytes(&self, address: Address, size: usize) -> MemoryResult<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.try_read_exact(address, &mut buffer)?;
        Ok(buffer)
    }

    fn try_read_array<const N: usize>(&self, address: Address) -> MemoryResult<[u8; N]> {
        let mut buffer = [0u8; N];
        self.try_read_exact(address, &mut buffer)?;
        Ok(buffer)
    }

    pub fn try_read_int32(&self, address: Address) -> MemoryResult<i32> {
        self.try_read_array(address).map(i32::from_ne_bytes)
    }

    pub fn try_read_float32(&self, address: Address) -> MemoryResult<f32> {
        self.try_read_array(address).map(f32::from_ne_bytes)
    }

    pub fn try_read_byte(&self, address: Address) -> MemoryResult<u8> {
        self.try_read_array::<1>(address).map(|[b]| b)
    }

    /// Read a 4-byte pointer stored in the target
    pub fn try_read_pointer32(&self, address: Address) -> MemoryResult<Address> {
        self.try_read_array(address)
            .map(u32::from_ne_bytes)
            .map(Address::from_pointer32)
    }

    /// Read an `i32`, or 0 if the read fails for any reason
    pub fn read_int32(&self, address: Address) -> i32 {
        self.try_read_int32(address).unwrap_or_else(zero_on_failure)
    }

    /// Read an `f32`, or 0.0 if the read fails for any reason
    pub fn read_float32(&self, address: Address) -> f32 {
        self.try_read_float32(address).unwrap_or_else(zero_on_failure)
    }

    /// Read a byte, or 0 if the read fails for any reason
    pub fn read_byte(&self, address: Address) -> u8 {
        self.try_read_byte(address).unwrap_or_else(zero_on_failure)
    }
}

fn zero_on_failure<T: Default>(error: MemoryError) -> T {
    debug!("read returned zero: {}", error);
    T::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessAccessor;
    use crate::testing::{MockMemory, MockProcessBackend};
    use std::sync::Arc;

    fn attached(memory: &MockMemory) -> MemoryAccessor {
        let backend = MockProcessBackend::new(memory.clone());
        backend.add_process(1, "target.exe");
        let process = Arc::new(ProcessAccessor::new(Arc::new(backend)));
        process.attach("target").unwrap();
        MemoryAccessor::new(process)
    }

    #[test]
    fn test_reads_native_byte_order() {
        let memory = MockMemory::new();
        memory.put_bytes(0x100, &0x0102_0304i32.to_ne_bytes());
        memory.put_bytes(0x200, &1.5f32.to_ne_bytes());
        memory.put_bytes(0x300, &[0xAB]);

        let accessor = attached(&memory);
        assert_eq!(accessor.read_int32(Address::new(0x100)), 0x0102_0304);
        assert_eq!(accessor.read_float32(Address::new(0x200)), 1.5);
        assert_eq!(accessor.read_byte(Address::new(0x300)), 0xAB);
    }

    #[test]
    fn test_unmapped_read_is_zero() {
        let memory = MockMemory::new();
        let accessor = attached(&memory);
        assert_eq!(accessor.read_int32(Address::new(0xDEAD)), 0);
        assert!(matches!(
            accessor.try_read_int32(Address::new(0xDEAD)),
            Err(MemoryError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_straddling_read_is_partial() {
        let memory = MockMemory::new();
        memory.map(0x1000, 2);
        let accessor = attached(&memory);
        assert!(matches!(
            accessor.try_read_int32(Address::new(0x1000)),
            Err(MemoryError::PartialRead {
                expected: 4,
                actual: 2,
                ..
            })
        ));
        assert_eq!(accessor.read_int32(Address::new(0x1000)), 0);
    }

    #[test]
    fn test_pointer32_is_unsigned() {
        let memory = MockMemory::new();
        memory.put_bytes(0x10, &0x9000_0000u32.to_ne_bytes());
        let accessor = attached(&memory);
        assert_eq!(
            accessor.try_read_pointer32(Address::new(0x10)).unwrap(),
            Address::new(0x9000_0000)
        );
    }

    #[test]
    fn test_empty_read_succeeds() {
        let memory = MockMemory::new();
        let accessor = attached(&memory);
        assert_eq!(accessor.try_read_bytes(Address::new(0x1), 0).unwrap(), Vec::<u8>::new());
    }
}
