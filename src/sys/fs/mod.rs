mod error;
mod media;
mod memory;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hal::io::Read;

pub use error::Error;
pub use media::{FileDescriptor, Media, Metadata, OpenOptions};
pub use memory::MemoryMedia;

const CHUNK_SIZE: usize = 64;

/// Open file on a media, closed when dropped
pub struct File<'a> {
    media: &'a dyn Media,
    fd: Option<FileDescriptor>,
}

impl<'a> File<'a> {
    pub fn open(media: &'a dyn Media, path: &str) -> Result<Self, Error> {
        OpenOptions::default().open(media, path)
    }

    pub fn metadata(&self) -> Result<Metadata, Error> {
        match self.fd {
            Some(ref fd) => self.media.metadata(fd),
            None => Err(Error::Generic),
        }
    }

    pub fn read_to_string(&mut self) -> Result<String, Error> {
        let mut bytes = Vec::new();
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let size = self.read(&mut chunk)?;
            if size == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..size]);
        }
        String::from_utf8(bytes).map_err(|_| Error::InvalidData)
    }

    pub fn close(&mut self) {
        if let Some(fd) = self.fd.take() {
            self.media.close(fd)
        }
    }
}

impl<'a> Drop for File<'a> {
    fn drop(&mut self) {
        self.close()
    }
}

impl<'a> Read for File<'a> {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if let Some(fd) = self.fd.as_ref() { self.media.read(fd, buf) } else { Ok(0) }
    }
}

impl<'a> fmt::Write for File<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(fd) = self.fd.as_ref() {
            let result = self.media.write(fd, s.as_bytes());
            result.map(|_| ()).map_err(|_| fmt::Error)
        } else {
            Err(fmt::Error)
        }
    }
}

impl OpenOptions {
    pub fn open<'a>(self, media: &'a dyn Media, path: &str) -> Result<File<'a>, Error> {
        let fd = media.open(path, self)?;
        Ok(File { media, fd: Some(fd) })
    }
}

mod test {
    #[test]
    fn test_read_to_string() {
        use super::{File, MemoryMedia};

        let media = MemoryMedia::new();
        let text = "{\"waypoints\": []}".repeat(10);
        media.insert("route.json", text.as_bytes());
        let mut file = File::open(&media, "route.json").unwrap();
        assert_eq!(file.metadata().map(|m| m.len()), Ok(text.len() as u64));
        assert_eq!(file.read_to_string(), Ok(text));
    }

    #[test]
    fn test_invalid_utf8() {
        use super::{Error, File, MemoryMedia};

        let media = MemoryMedia::new();
        media.insert("route.json", &[0xC3, 0x28]);
        let mut file = File::open(&media, "route.json").unwrap();
        assert_eq!(file.read_to_string(), Err(Error::InvalidData));
    }

    #[test]
    fn test_closed_on_drop() {
        use super::{File, MemoryMedia};
        use crate::sys::fs::memory::MAX_OPEN_FILES;

        let media = MemoryMedia::new();
        media.insert("a", b"x");
        for _ in 0..MAX_OPEN_FILES + 1 {
            File::open(&media, "a").unwrap();
        }
    }

    #[test]
    fn test_write_file() {
        use core::fmt::Write;

        use super::{MemoryMedia, OpenOptions};

        let media = MemoryMedia::new();
        let options = OpenOptions::default().write(true).create(true).truncate(true);
        let mut file = options.open(&media, "status.txt").unwrap();
        write!(file, "{}/{}", 2, 5).unwrap();
        file.close();
        assert_eq!(media.contents("status.txt"), Some(b"2/5".to_vec()));
    }
}
