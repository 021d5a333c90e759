use serde::Serialize;
use std::fmt;

pub type Offset = u64;

/// `XFSB`, the first four bytes of an XFS primary superblock.
pub const XFS_SUPERBLOCK_MAGIC: [u8; 4] = *b"XFSB";
pub const XFS_SUPERBLOCK_OFFSET: Offset = 0;

/// `IN`, the first two bytes of an on-disk inode core.
pub const INODE_MAGIC: [u8; 2] = *b"IN";
pub const INODE_SIZE: usize = 512;

/// Byte offset of the mode byte whose high nibble carries the type code.
pub const MODE_BYTE_OFFSET: usize = 2;
pub const ATIME_OFFSET: usize = 32;
pub const MTIME_OFFSET: usize = 40;
pub const CTIME_OFFSET: usize = 48;

/// A window shorter than this at the end of the image is not inspected.
pub const MIN_INODE_WINDOW: usize = 4;

pub const SHORTFORM_WINDOW_SIZE: usize = 256;
pub const SHORTFORM_INODE_NUMBER_OFFSET: usize = 152;
pub const SHORTFORM_ENTRY_COUNT_OFFSET: usize = 176;

/// Inode number reported as the filesystem root.
///
/// Not read from the superblock; scanners treat it as a fixed convention.
pub const DEFAULT_ROOT_INODE: u64 = 128;

/// One 512-byte window that starts with the inode magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InodeRecord {
    pub physical_offset: Offset,
    pub type_code: u8,
    pub atime: u32,
    pub mtime: u32,
    pub ctime: u32,
}

impl InodeRecord {
    #[inline]
    pub fn inode_number(&self) -> u64 {
        self.physical_offset / INODE_SIZE as u64
    }

    /// True when all three timestamps decoded to a nonzero value.
    #[inline]
    pub fn has_times(&self) -> bool {
        self.atime != 0 && self.mtime != 0 && self.ctime != 0
    }

    #[inline]
    pub fn file_type(&self) -> FileType {
        FileType::from_code(self.type_code)
    }
}

/// A short-form directory inode candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortformInodeRecord {
    pub inode_number: u64,
    pub physical_offset: Offset,
    pub entry_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Fifo,
    CharacterDevice,
    Directory,
    BlockDevice,
    RegularFile,
    Symlink,
    Socket,
    Unrecognized(u8),
}

impl FileType {
    pub fn from_code(code: u8) -> Self {
        match code & 0xF {
            0x1 => FileType::Fifo,
            0x2 => FileType::CharacterDevice,
            0x4 => FileType::Directory,
            0x6 => FileType::BlockDevice,
            0x8 => FileType::RegularFile,
            0xA => FileType::Symlink,
            0xC => FileType::Socket,
            other => FileType::Unrecognized(other),
        }
    }

    /// Whether `code` appears in the fixed table of known type codes.
    #[inline]
    pub fn is_known_code(code: u8) -> bool {
        !matches!(FileType::from_code(code), FileType::Unrecognized(_))
    }

    pub fn name(&self) -> String {
        match self {
            FileType::Fifo => "FIFO".to_string(),
            FileType::CharacterDevice => "Character Device".to_string(),
            FileType::Directory => "Directory".to_string(),
            FileType::BlockDevice => "Block Device".to_string(),
            FileType::RegularFile => "Regular File".to_string(),
            FileType::Symlink => "Symlink".to_string(),
            FileType::Socket => "Socket".to_string(),
            FileType::Unrecognized(code) => format!("Unknown (0x{:X})", code),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationLabel {
    RootDirectory,
    KnownType(FileType),
    ProbablyDeleted,
    Unknown,
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationLabel::RootDirectory => f.write_str("Root Directory"),
            ClassificationLabel::KnownType(ft) => write!(f, "{}", ft),
            ClassificationLabel::ProbablyDeleted => f.write_str("Probably Deleted File"),
            ClassificationLabel::Unknown => f.write_str("Unknown (0x0)"),
        }
    }
}

impl Serialize for ClassificationLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
