pub trait Read {
    type Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl Read for &[u8] {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let size = core::cmp::min(self.len(), buf.len());
        buf[..size].copy_from_slice(&self[..size]);
        *self = &self[size..];
        Ok(size)
    }
}
