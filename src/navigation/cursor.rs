use hal::persist::{ByteStore, ERASED};

/// Highest index that can be persisted, one below the erased marker
pub const MAX_INDEX: u8 = ERASED - 1;

/// Single byte cell mirroring the active waypoint index
pub struct CursorSlot<S> {
    store: S,
    address: u16,
}

impl<S: ByteStore> CursorSlot<S> {
    pub fn new(store: S, address: u16) -> Self {
        Self { store, address }
    }

    /// `None` when nothing was ever persisted
    pub fn load(&self) -> Result<Option<u8>, S::Error> {
        let value = self.store.read_byte(self.address)?;
        Ok(if value == ERASED { None } else { Some(value) })
    }

    pub fn store(&mut self, index: u8) -> Result<(), S::Error> {
        self.store.write_byte(self.address, index)
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

mod test {
    #[test]
    fn test_cursor_slot() {
        use crate::sys::persist::MemoryStore;

        use super::CursorSlot;

        let mut slot = CursorSlot::new(MemoryStore::<8>::new(), 5);
        assert_eq!(slot.load(), Ok(None));
        slot.store(3).unwrap();
        assert_eq!(slot.load(), Ok(Some(3)));
        assert_eq!(slot.into_inner().cells()[5], 3);
    }
}
