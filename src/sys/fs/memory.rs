use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use super::error::Error;
use super::media::{FileDescriptor, Media, Metadata, OpenOptions};

pub const MAX_OPEN_FILES: usize = 4;

struct Handle {
    file: usize,
    position: usize,
    options: OpenOptions,
}

#[derive(Default)]
struct State {
    files: Vec<(String, Vec<u8>)>,
    handles: [Option<Handle>; MAX_OPEN_FILES],
}

/// RAM backed media, contents are lost on reset
#[derive(Default)]
pub struct MemoryMedia(Mutex<State>);

impl MemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn insert(&self, path: &str, content: &[u8]) {
        let mut state = self.0.lock();
        match state.files.iter_mut().find(|(name, _)| name.as_str() == path) {
            Some((_, bytes)) => *bytes = content.into(),
            None => state.files.push((path.into(), content.into())),
        }
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.0.lock();
        state.files.iter().find(|(name, _)| name == path).map(|(_, bytes)| bytes.clone())
    }
}

impl Media for MemoryMedia {
    fn open(&self, path: &str, options: OpenOptions) -> Result<FileDescriptor, Error> {
        let mut state = self.0.lock();
        let slot = state.handles.iter().position(|h| h.is_none());
        let slot = slot.ok_or(Error::InsufficentResource)?;
        let file = match state.files.iter().position(|(name, _)| name == path) {
            Some(index) => index,
            None if options.create && options.write => {
                state.files.push((path.into(), Vec::new()));
                state.files.len() - 1
            }
            None => return Err(Error::NotFound),
        };
        if options.truncate && options.write {
            state.files[file].1.clear();
        }
        let position = if options.append { state.files[file].1.len() } else { 0 };
        state.handles[slot] = Some(Handle { file, position, options });
        Ok(FileDescriptor(slot))
    }

    fn close(&self, fd: FileDescriptor) {
        if let Some(slot) = self.0.lock().handles.get_mut(fd.0) {
            *slot = None;
        }
    }

    fn read(&self, fd: &FileDescriptor, buf: &mut [u8]) -> Result<usize, Error> {
        let mut state = self.0.lock();
        let State { files, handles } = &mut *state;
        let handle = handles.get_mut(fd.0).and_then(|h| h.as_mut()).ok_or(Error::Generic)?;
        if !handle.options.read {
            return Err(Error::PermissionDenied);
        }
        let bytes = &files[handle.file].1;
        let remain = &bytes[handle.position.min(bytes.len())..];
        let size = remain.len().min(buf.len());
        buf[..size].copy_from_slice(&remain[..size]);
        handle.position += size;
        Ok(size)
    }

    fn write(&self, fd: &FileDescriptor, bytes: &[u8]) -> Result<usize, Error> {
        let mut state = self.0.lock();
        let State { files, handles } = &mut *state;
        let handle = handles.get_mut(fd.0).and_then(|h| h.as_mut()).ok_or(Error::Generic)?;
        if !handle.options.write {
            return Err(Error::PermissionDenied);
        }
        let content = &mut files[handle.file].1;
        let end = handle.position + bytes.len();
        if content.len() < end {
            content.resize(end, 0);
        }
        content[handle.position..end].copy_from_slice(bytes);
        handle.position = end;
        Ok(bytes.len())
    }

    fn metadata(&self, fd: &FileDescriptor) -> Result<Metadata, Error> {
        let state = self.0.lock();
        let handle = state.handles.get(fd.0).and_then(|h| h.as_ref()).ok_or(Error::Generic)?;
        Ok(Metadata { length: state.files[handle.file].1.len() as u64 })
    }
}

mod test {
    #[test]
    fn test_open_missing() {
        use super::super::{Error, Media, OpenOptions};
        use super::MemoryMedia;

        let media = MemoryMedia::new();
        assert_eq!(media.open("route.json", OpenOptions::default()), Err(Error::NotFound));
    }

    #[test]
    fn test_descriptor_exhausted() {
        use super::super::{Error, Media, OpenOptions};
        use super::{MemoryMedia, MAX_OPEN_FILES};

        let media = MemoryMedia::new();
        media.insert("a", b"");
        for _ in 0..MAX_OPEN_FILES {
            media.open("a", OpenOptions::default()).unwrap();
        }
        assert_eq!(media.open("a", OpenOptions::default()), Err(Error::InsufficentResource));
    }

    #[test]
    fn test_write_then_read() {
        use super::super::{Media, OpenOptions};
        use super::MemoryMedia;

        let media = MemoryMedia::new();
        let options = OpenOptions::default().write(true).create(true);
        let fd = media.open("log", options).unwrap();
        assert_eq!(media.write(&fd, b"abc"), Ok(3));
        media.close(fd);
        let fd = media.open("log", OpenOptions::default().write(true).append(true)).unwrap();
        media.write(&fd, b"de").unwrap();
        assert_eq!(media.metadata(&fd).map(|m| m.len()), Ok(5));
        media.close(fd);

        let fd = media.open("log", OpenOptions::default()).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(media.read(&fd, &mut buffer), Ok(4));
        assert_eq!(&buffer, b"abcd");
        assert_eq!(media.read(&fd, &mut buffer), Ok(1));
        assert_eq!(media.read(&fd, &mut buffer), Ok(0));
    }
}
