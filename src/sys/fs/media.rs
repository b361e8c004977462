use super::error::Error;

#[derive(Copy, Clone, Debug)]
pub struct OpenOptions {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub append: bool,
    pub truncate: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { read: true, write: false, create: false, append: false, truncate: false }
    }
}

impl OpenOptions {
    pub fn read(mut self, b: bool) -> Self {
        self.read = b;
        self
    }

    pub fn write(mut self, b: bool) -> Self {
        self.write = b;
        self
    }

    pub fn create(mut self, b: bool) -> Self {
        self.create = b;
        self
    }

    pub fn append(mut self, b: bool) -> Self {
        self.append = b;
        self
    }

    pub fn truncate(mut self, b: bool) -> Self {
        self.truncate = b;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Metadata {
    pub length: u64,
}

impl Metadata {
    pub fn len(&self) -> u64 {
        self.length
    }
}

#[derive(Debug, PartialEq)]
pub struct FileDescriptor(pub usize);

/// Storage medium holding named files, e.g. an SD card or on-chip flash
pub trait Media {
    fn open(&self, path: &str, options: OpenOptions) -> Result<FileDescriptor, Error>;
    fn close(&self, fd: FileDescriptor);
    fn read(&self, fd: &FileDescriptor, buf: &mut [u8]) -> Result<usize, Error>;
    fn write(&self, fd: &FileDescriptor, bytes: &[u8]) -> Result<usize, Error>;
    fn metadata(&self, fd: &FileDescriptor) -> Result<Metadata, Error>;
}
