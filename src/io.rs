//! Read-only access to XFS images and block devices.
//!
//! Scanning goes through [`ImageSource`], which both the on-disk
//! [`DiskReader`] and in-memory cursors implement. The short-form mode
//! needs the whole image at once and uses [`ImageBuffer`] instead.

use crate::error::{Result, ScanError};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Read size for sequential scans. A multiple of the inode size, so
/// windows never straddle two reads.
pub const BUFFER_SIZE: usize = 1024 * 1024;

/// A seekable, byte-addressable image whose length is known up front.
pub trait ImageSource {
    /// Reads up to `buffer.len()` bytes starting at `offset`.
    ///
    /// Returns fewer bytes than requested only when the end of the image
    /// is reached, and `0` at or past the end.
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize>;

    /// Total size of the image in bytes.
    fn size(&self) -> u64;

    /// Loads the whole image into memory.
    fn load_all(&mut self) -> Result<ImageBuffer> {
        let len = usize::try_from(self.size())
            .map_err(|_| ScanError::Io(io::Error::other("image too large to buffer")))?;
        let mut data = vec![0u8; len];
        let n = self.read_chunk(0, &mut data)?;
        data.truncate(n);
        Ok(ImageBuffer::Owned(data))
    }
}

pub struct DiskReader {
    file: File,
    path: PathBuf,
    size: u64,
}

impl DiskReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path)
            .map_err(|source| ScanError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{Advice, fadvise};
            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        // Seeking to the end also reports the size of block devices,
        // whose metadata length is 0.
        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        tracing::debug!(path = %path.display(), size, "opened image");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for DiskReader {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| ScanError::Read { offset, source })?;

        let mut filled = 0;
        while filled < buffer.len() {
            match self.file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(ScanError::Read { offset, source }),
            }
        }
        Ok(filled)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }

    fn load_all(&mut self) -> Result<ImageBuffer> {
        ImageBuffer::load(&self.path)
    }
}

impl<T: AsRef<[u8]>> ImageSource for Cursor<T> {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        let data = self.get_ref().as_ref();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(buffer.len()).min(data.len());
        let len = end - start;
        buffer[..len].copy_from_slice(&data[start..end]);
        Ok(len)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.get_ref().as_ref().len() as u64
    }
}

/// The whole image held in memory, either mapped or read.
pub enum ImageBuffer {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl ImageBuffer {
    /// Maps the image at `path`, falling back to a plain read when mapping
    /// is not possible (empty files, block devices, special files).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        if file.metadata()?.len() > 0 {
            match unsafe { Mmap::map(&file) } {
                Ok(mmap) if !mmap.is_empty() => {
                    #[cfg(target_os = "linux")]
                    {
                        let _ = mmap.advise(memmap2::Advice::Sequential);
                    }
                    tracing::debug!(path = %path.display(), len = mmap.len(), "mapped image");
                    return Ok(ImageBuffer::Mapped(mmap));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "mmap failed, reading image");
                }
            }
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|source| ScanError::Read { offset: 0, source })?;
        tracing::debug!(path = %path.display(), len = data.len(), "read image into memory");
        Ok(ImageBuffer::Owned(data))
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self, ImageBuffer::Mapped(_))
    }
}

impl Deref for ImageBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ImageBuffer::Mapped(m) => m,
            ImageBuffer::Owned(v) => v,
        }
    }
}
