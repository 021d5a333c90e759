//! Run configuration.

use crate::classify::ReportFilter;
use crate::names::DEFAULT_NCHECK_PROGRAM;
use crate::types::DEFAULT_ROOT_INODE;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Report every inode record.
    #[default]
    All,
    AllocatedOnly,
    DeletedOnly,
    /// Locate short-form directory inodes instead of scanning inodes.
    Shortform,
}

impl ScanMode {
    /// The report filter for inode modes, `None` for short-form mode.
    pub fn report_filter(&self) -> Option<ReportFilter> {
        match self {
            ScanMode::All => Some(ReportFilter::All),
            ScanMode::AllocatedOnly => Some(ReportFilter::AllocatedOnly),
            ScanMode::DeletedOnly => Some(ReportFilter::DeletedOnly),
            ScanMode::Shortform => None,
        }
    }
}

/// Options for one scan of an image
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to the image file or block device
    pub image_path: PathBuf,
    pub mode: ScanMode,
    /// Inode number labeled as the root directory
    pub root_inode: u64,
    /// Whether to ask the name resolver for path names
    pub resolve_names: bool,
    /// Program used for name resolution
    pub ncheck_program: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            image_path: PathBuf::new(),
            mode: ScanMode::All,
            root_inode: DEFAULT_ROOT_INODE,
            resolve_names: true,
            ncheck_program: DEFAULT_NCHECK_PROGRAM.to_string(),
        }
    }
}

impl ScanOptions {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_root_inode(mut self, root_inode: u64) -> Self {
        self.root_inode = root_inode;
        self
    }

    pub fn with_ncheck_program(mut self, program: impl Into<String>) -> Self {
        self.ncheck_program = program.into();
        self
    }

    /// Skips name resolution entirely
    pub fn without_names(mut self) -> Self {
        self.resolve_names = false;
        self
    }
}
