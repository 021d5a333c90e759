//! Short-form directory inode locator.
//!
//! Walks a fully buffered image with two strides: 16 bytes while looking
//! for the inode magic, 256 bytes after a window has been accepted.
//! Accepted windows are assumed not to overlap.

use crate::types::{
    INODE_MAGIC, Offset, SHORTFORM_ENTRY_COUNT_OFFSET, SHORTFORM_INODE_NUMBER_OFFSET,
    SHORTFORM_WINDOW_SIZE, ShortformInodeRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// Re-alignment step while searching for the magic.
    Fine,
    /// Skips a whole accepted window.
    Coarse,
}

impl Stride {
    pub const FINE_BYTES: usize = 16;
    pub const COARSE_BYTES: usize = SHORTFORM_WINDOW_SIZE;

    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Stride::Fine => Self::FINE_BYTES,
            Stride::Coarse => Self::COARSE_BYTES,
        }
    }
}

/// Outcome of inspecting the buffer at one cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    NoSignature,
    /// Magic present but the window failed validation.
    Rejected,
    Matched(ShortformInodeRecord),
}

impl Step {
    #[inline]
    pub fn stride(&self) -> Stride {
        match self {
            Step::Matched(_) => Stride::Coarse,
            Step::NoSignature | Step::Rejected => Stride::Fine,
        }
    }
}

pub fn inspect(data: &[u8], cursor: usize) -> Step {
    match data.get(cursor..) {
        Some(rest) if rest.starts_with(&INODE_MAGIC) => {
            match parse_shortform_window(data, cursor) {
                Some(record) => Step::Matched(record),
                None => Step::Rejected,
            }
        }
        _ => Step::NoSignature,
    }
}

/// Decodes the 256-byte window at `offset`, or `None` if it is truncated,
/// lacks the magic, or has no entries.
pub fn parse_shortform_window(data: &[u8], offset: usize) -> Option<ShortformInodeRecord> {
    let window = data.get(offset..offset.checked_add(SHORTFORM_WINDOW_SIZE)?)?;
    if !window.starts_with(&INODE_MAGIC) {
        return None;
    }

    let entry_count = window[SHORTFORM_ENTRY_COUNT_OFFSET];
    if entry_count == 0 {
        return None;
    }

    let number_bytes: [u8; 8] = window
        [SHORTFORM_INODE_NUMBER_OFFSET..SHORTFORM_INODE_NUMBER_OFFSET + 8]
        .try_into()
        .ok()?;

    Some(ShortformInodeRecord {
        inode_number: u64::from_be_bytes(number_bytes),
        physical_offset: offset as Offset,
        entry_count,
    })
}

/// Incremental scan; records are yielded as soon as they are found.
pub struct ShortformScan<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> ShortformScan<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Iterator for ShortformScan<'_> {
    type Item = ShortformInodeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.data.len().saturating_sub(self.cursor) >= SHORTFORM_WINDOW_SIZE {
            let step = inspect(self.data, self.cursor);
            self.cursor += step.stride().bytes();
            if let Step::Matched(record) = step {
                return Some(record);
            }
        }
        None
    }
}

pub fn scan_shortform(data: &[u8]) -> ShortformScan<'_> {
    tracing::info!(len = data.len(), "scanning for short-form directory inodes");
    ShortformScan::new(data)
}
