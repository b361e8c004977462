/// Sector organised flash, erased state of every word is all ones.
///
/// Programming may only clear bits, so a word must be erased (with its whole
/// sector) before it is programmed a second time.
pub trait Flash<W> {
    type Error;

    /// Number of words in one sector
    fn sector_size(&self) -> usize;
    fn read(&self, sector: usize, offset: usize) -> W;
    fn erase(&mut self, sector: usize) -> Result<(), Self::Error>;
    fn program(&mut self, sector: usize, offset: usize, words: &[W]) -> Result<(), Self::Error>;
}
