use hal::persist::{ByteStore, ERASED};

#[derive(Copy, Clone, Debug, PartialEq, Display)]
#[display(fmt = "address {} out of range", _0)]
pub struct OutOfRange(pub u16);

/// Volatile stand-in for EEPROM, starts out erased
#[derive(Clone, Debug)]
pub struct MemoryStore<const N: usize>([u8; N]);

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self([ERASED; N])
    }
}

impl<const N: usize> MemoryStore<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[u8] {
        &self.0[..]
    }
}

impl<const N: usize> ByteStore for MemoryStore<N> {
    type Error = OutOfRange;

    fn read_byte(&self, address: u16) -> Result<u8, OutOfRange> {
        self.0.get(address as usize).copied().ok_or(OutOfRange(address))
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), OutOfRange> {
        let cell = self.0.get_mut(address as usize).ok_or(OutOfRange(address))?;
        *cell = value;
        Ok(())
    }
}

mod test {
    #[test]
    fn test_memory_store() {
        use hal::persist::ByteStore;

        use super::{MemoryStore, OutOfRange};

        let mut store = MemoryStore::<4>::new();
        assert_eq!(store.read_byte(3), Ok(0xFF));
        store.write_byte(3, 7).unwrap();
        assert_eq!(store.cells(), &[0xFF, 0xFF, 0xFF, 7]);
        assert_eq!(store.write_byte(4, 1), Err(OutOfRange(4)));
        assert_eq!(store.read_byte(4), Err(OutOfRange(4)));
    }
}
