use hal::flash::Flash;
use hal::persist::{ByteStore, ERASED};

const ACTIVE: u32 = 0x45455052;
const EMPTY: u32 = 0xFFFFFFFF;

// record layout: tag(8) | address(16) | value(8)
const TAG: u32 = 0x5A;

fn record(address: u16, value: u8) -> u32 {
    TAG << 24 | (address as u32) << 8 | value as u32
}

fn parse(word: u32) -> Option<(u16, u8)> {
    match word >> 24 == TAG {
        true => Some(((word >> 8) as u16, word as u8)),
        false => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error<E> {
    Flash(E),
    /// Distinct addresses in use no longer fit into one sector
    Full,
}

/// Byte cells emulated on two flash sectors.
///
/// Every write appends a record to the active sector, reads return the latest
/// record of an address. A full sector is compacted into the spare one, whose
/// header is programmed last so an interrupted compaction leaves the old
/// sector authoritative.
pub struct Eeprom<F> {
    flash: F,
    active_sector: usize,
    write_offset: usize,
}

impl<E, F: Flash<u32, Error = E>> Eeprom<F> {
    fn is_blank(&self, sector: usize) -> bool {
        (0..self.flash.sector_size()).all(|i| self.flash.read(sector, i) == EMPTY)
    }

    fn locate(&self, sector: usize) -> usize {
        let size = self.flash.sector_size();
        (1..size).find(|&i| self.flash.read(sector, i) == EMPTY).unwrap_or(size)
    }

    pub fn new(flash: F) -> Result<Self, E> {
        let mut eeprom = Self { flash, active_sector: 0, write_offset: 1 };
        eeprom.mount()?;
        Ok(eeprom)
    }

    fn mount(&mut self) -> Result<(), E> {
        let size = self.flash.sector_size();
        let headers = (self.flash.read(0, 0), self.flash.read(1, 0));
        let active_sector = match headers {
            (ACTIVE, ACTIVE) => match self.flash.read(0, size - 1) {
                EMPTY => 0,
                _ if self.flash.read(1, size - 1) == EMPTY => 1,
                _ => 0,
            },
            (_, ACTIVE) => 1,
            _ => 0,
        };
        if self.flash.read(active_sector, 0) != ACTIVE {
            if !self.is_blank(active_sector) {
                self.flash.erase(active_sector)?;
            }
            self.flash.program(active_sector, 0, &[ACTIVE])?;
        }
        let spare = active_sector ^ 1;
        if !self.is_blank(spare) {
            debug!("EEPROM erasing stale sector {}", spare);
            self.flash.erase(spare)?;
        }
        self.active_sector = active_sector;
        self.write_offset = self.locate(active_sector);
        debug!("EEPROM sector {} mounted, {} records", active_sector, self.write_offset - 1);
        Ok(())
    }

    fn lookup(&self, address: u16) -> Option<u8> {
        let sector = self.active_sector;
        (1..self.write_offset).rev().find_map(|i| match parse(self.flash.read(sector, i)) {
            Some((a, value)) if a == address => Some(value),
            _ => None,
        })
    }

    fn compact(&mut self, address: u16, value: u8) -> Result<(), Error<E>> {
        let (source, target) = (self.active_sector, self.active_sector ^ 1);
        let size = self.flash.sector_size();
        if !self.is_blank(target) {
            self.flash.erase(target).map_err(Error::Flash)?;
        }
        // last word of a compacted sector stays empty, see mount
        let mut offset = 1;
        for i in 1..self.write_offset {
            let (a, v) = match parse(self.flash.read(source, i)) {
                Some(entry) => entry,
                None => continue,
            };
            let superseded = (i + 1..self.write_offset)
                .any(|j| parse(self.flash.read(source, j)).map(|(b, _)| b) == Some(a));
            if superseded || a == address || v == ERASED {
                continue;
            }
            if offset >= size - 2 {
                return Err(Error::Full);
            }
            self.flash.program(target, offset, &[record(a, v)]).map_err(Error::Flash)?;
            offset += 1;
        }
        if value != ERASED {
            self.flash.program(target, offset, &[record(address, value)]).map_err(Error::Flash)?;
            offset += 1;
        }
        self.flash.program(target, 0, &[ACTIVE]).map_err(Error::Flash)?;
        self.flash.erase(source).map_err(Error::Flash)?;
        debug!("EEPROM compacted into sector {}, {} records", target, offset - 1);
        self.active_sector = target;
        self.write_offset = offset;
        Ok(())
    }

    /// Erase every cell
    pub fn reset(&mut self) -> Result<(), E> {
        self.flash.erase(self.active_sector)?;
        self.flash.program(self.active_sector, 0, &[ACTIVE])?;
        self.write_offset = 1;
        Ok(())
    }

    pub fn release(self) -> F {
        self.flash
    }
}

impl<E, F: Flash<u32, Error = E>> ByteStore for Eeprom<F> {
    type Error = Error<E>;

    fn read_byte(&self, address: u16) -> Result<u8, Error<E>> {
        Ok(self.lookup(address).unwrap_or(ERASED))
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error<E>> {
        if self.lookup(address).unwrap_or(ERASED) == value {
            return Ok(());
        }
        if self.write_offset >= self.flash.sector_size() {
            return self.compact(address, value);
        }
        let word = record(address, value);
        self.flash.program(self.active_sector, self.write_offset, &[word]).map_err(Error::Flash)?;
        self.write_offset += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use hal::flash::Flash;

    pub struct DummyFlash([[u32; 8]; 2]);

    impl Default for DummyFlash {
        fn default() -> Self {
            Self([[super::EMPTY; 8]; 2])
        }
    }

    impl Flash<u32> for DummyFlash {
        type Error = ();

        fn sector_size(&self) -> usize {
            8
        }

        fn read(&self, sector: usize, offset: usize) -> u32 {
            self.0[sector][offset]
        }

        fn erase(&mut self, sector: usize) -> Result<(), ()> {
            self.0[sector] = [super::EMPTY; 8];
            Ok(())
        }

        fn program(&mut self, sector: usize, offset: usize, words: &[u32]) -> Result<(), ()> {
            for (i, &word) in words.iter().enumerate() {
                self.0[sector][offset + i] &= word;
            }
            Ok(())
        }
    }

    #[test]
    fn test_eeprom() {
        use hal::persist::ByteStore;

        let eeprom = super::Eeprom::new(DummyFlash::default()).unwrap();
        assert_eq!(eeprom.release().0[0][0], super::ACTIVE);

        let mut eeprom = super::Eeprom::new(DummyFlash::default()).unwrap();
        assert_eq!(eeprom.read_byte(0), Ok(0xFF));
        eeprom.write_byte(0, 3).expect("write");
        eeprom.write_byte(1, 4).expect("write");
        assert_eq!(eeprom.read_byte(0), Ok(3));
        assert_eq!(eeprom.read_byte(1), Ok(4));
        eeprom.write_byte(0, 5).expect("write");
        assert_eq!(eeprom.read_byte(0), Ok(5));
        assert_eq!(eeprom.write_offset, 4);
    }

    #[test]
    fn test_skip_unchanged() {
        use hal::persist::ByteStore;

        let mut eeprom = super::Eeprom::new(DummyFlash::default()).unwrap();
        eeprom.write_byte(7, 1).expect("write");
        eeprom.write_byte(7, 1).expect("write");
        assert_eq!(eeprom.write_offset, 2);
    }

    #[test]
    fn test_compaction() {
        use hal::persist::ByteStore;

        let mut eeprom = super::Eeprom::new(DummyFlash::default()).unwrap();
        for value in 0..7 {
            eeprom.write_byte(0, value).expect("write");
        }
        assert_eq!(eeprom.active_sector, 0);
        eeprom.write_byte(1, 9).expect("write");
        eeprom.write_byte(0, 42).expect("write");
        assert_eq!(eeprom.active_sector, 1);
        assert_eq!(eeprom.read_byte(0), Ok(42));
        assert_eq!(eeprom.read_byte(1), Ok(9));

        let flash = eeprom.release();
        assert_eq!(flash.0[0], [super::EMPTY; 8]);
        let eeprom = super::Eeprom::new(flash).unwrap();
        assert_eq!(eeprom.active_sector, 1);
        assert_eq!(eeprom.read_byte(0), Ok(42));
        assert_eq!(eeprom.read_byte(1), Ok(9));
    }

    #[test]
    fn test_sector_full() {
        use hal::persist::ByteStore;

        let mut eeprom = super::Eeprom::new(DummyFlash::default()).unwrap();
        for address in 0..7 {
            eeprom.write_byte(address, 1).expect("write");
        }
        assert_eq!(eeprom.write_byte(7, 1), Err(super::Error::Full));
    }

    #[test]
    fn test_interrupted_compaction() {
        use hal::persist::ByteStore;

        let mut flash = DummyFlash::default();
        flash.0[0][0] = super::ACTIVE;
        for value in 1..8 {
            flash.0[0][value as usize] = super::record(0, value);
        }
        flash.0[1][1] = super::record(0, 7);
        let eeprom = super::Eeprom::new(flash).unwrap();
        assert_eq!(eeprom.active_sector, 0);
        assert_eq!(eeprom.read_byte(0), Ok(7));
        assert_eq!(eeprom.release().0[1], [super::EMPTY; 8]);
    }

    #[test]
    fn test_load_from_existing() {
        use hal::persist::ByteStore;

        let mut flash = DummyFlash::default();
        flash.0[1][0] = super::ACTIVE;
        flash.0[1][1] = super::record(3, 8);
        let eeprom = super::Eeprom::new(flash).unwrap();
        assert_eq!(eeprom.active_sector, 1);
        assert_eq!(eeprom.read_byte(3), Ok(8));
        assert_eq!(eeprom.read_byte(4), Ok(0xFF));
    }
}
