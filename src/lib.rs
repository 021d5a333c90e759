pub mod classify;
pub mod cli;
pub mod config;
mod error;
pub mod io;
pub mod names;
pub mod report;
pub mod scanner;
pub mod session;
pub mod shortform;
pub mod superblock;
pub mod types;

pub use classify::{ClassifiedInode, InodeClassifier, ReportFilter};
pub use config::{ScanMode, ScanOptions};
pub use error::{Result, ScanError};
pub use io::{DiskReader, ImageBuffer, ImageSource};
pub use names::{NameMap, NameResolver, NcheckResolver, NoNames};
pub use session::{ScanOutcome, ScanSession};
pub use types::{
    ClassificationLabel, FileType, InodeRecord, Offset, ShortformInodeRecord, DEFAULT_ROOT_INODE,
};
