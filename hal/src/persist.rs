/// Value of a cell that has never been written since the medium was erased
pub const ERASED: u8 = 0xFF;

/// Byte addressable non-volatile storage, e.g. EEPROM or an emulation on flash.
///
/// Reading back an address must yield the last value written to it, also after
/// a power cycle. Cells never written read as [`ERASED`].
pub trait ByteStore {
    type Error;

    fn read_byte(&self, address: u16) -> Result<u8, Self::Error>;
    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Self::Error>;
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    type Error = S::Error;

    fn read_byte(&self, address: u16) -> Result<u8, S::Error> {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), S::Error> {
        (**self).write_byte(address, value)
    }
}
