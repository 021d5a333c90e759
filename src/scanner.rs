//! Fixed-stride inode scan.
//!
//! The image is read in 512-byte windows starting at offset 0. Every
//! window whose first two bytes are the inode magic becomes an
//! [`InodeRecord`]; the stride never changes, matched or not.

use crate::error::Result;
use crate::io::{BUFFER_SIZE, ImageSource};
use crate::types::{
    ATIME_OFFSET, CTIME_OFFSET, INODE_MAGIC, INODE_SIZE, InodeRecord, MIN_INODE_WINDOW,
    MODE_BYTE_OFFSET, MTIME_OFFSET, Offset,
};

/// Lazy scan over an image. Each call to [`InodeScan::new`] restarts at
/// offset 0.
///
/// The image is read [`BUFFER_SIZE`] bytes at a time and windows are cut
/// from the buffer.
pub struct InodeScan<'a, S: ImageSource + ?Sized> {
    source: &'a mut S,
    size: u64,
    offset: Offset,
    buffer: Vec<u8>,
    buffer_start: Offset,
    buffer_len: usize,
    done: bool,
}

impl<'a, S: ImageSource + ?Sized> InodeScan<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        let size = source.size();
        let capacity = usize::try_from(size).map_or(BUFFER_SIZE, |s| s.min(BUFFER_SIZE));
        Self {
            source,
            size,
            offset: 0,
            buffer: vec![0u8; capacity],
            buffer_start: 0,
            buffer_len: 0,
            done: false,
        }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    fn refill(&mut self) -> Result<()> {
        self.buffer_start = self.offset;
        self.buffer_len = self.source.read_chunk(self.offset, &mut self.buffer)?;
        Ok(())
    }
}

impl<S: ImageSource + ?Sized> Iterator for InodeScan<'_, S> {
    type Item = Result<InodeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.offset < self.size {
            if self.offset >= self.buffer_start + self.buffer_len as u64 {
                if let Err(e) = self.refill() {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            let offset = self.offset;
            let start = (offset - self.buffer_start) as usize;
            let end = (start + INODE_SIZE).min(self.buffer_len);
            if end.saturating_sub(start) < MIN_INODE_WINDOW {
                self.done = true;
                break;
            }
            self.offset += INODE_SIZE as u64;

            if let Some(record) = parse_inode_window(offset, &self.buffer[start..end]) {
                return Some(Ok(record));
            }
        }
        None
    }
}

/// Materializes the whole scan in offset order.
pub fn scan_inodes<S: ImageSource + ?Sized>(source: &mut S) -> Result<Vec<InodeRecord>> {
    let size = source.size();
    tracing::info!(size, "scanning for inode records");

    let records = InodeScan::new(source).collect::<Result<Vec<_>>>()?;

    tracing::debug!(found = records.len(), "inode scan complete");
    Ok(records)
}

/// Decodes one window, or `None` when it does not start with the magic.
///
/// Timestamps that do not fit in `window` are all reported as zero.
pub fn parse_inode_window(offset: Offset, window: &[u8]) -> Option<InodeRecord> {
    if !window.starts_with(&INODE_MAGIC) {
        return None;
    }
    let mode_byte = *window.get(MODE_BYTE_OFFSET)?;

    let (atime, mtime, ctime) = match (
        read_be_u32(window, ATIME_OFFSET),
        read_be_u32(window, MTIME_OFFSET),
        read_be_u32(window, CTIME_OFFSET),
    ) {
        (Some(a), Some(m), Some(c)) => (a, m, c),
        _ => (0, 0, 0),
    };

    Some(InodeRecord {
        physical_offset: offset,
        type_code: type_code_from_mode(mode_byte),
        atime,
        mtime,
        ctime,
    })
}

#[inline]
pub fn type_code_from_mode(mode_byte: u8) -> u8 {
    (mode_byte >> 4) & 0xF
}

#[inline]
fn read_be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}
