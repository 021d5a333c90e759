use crate::config::{ScanMode, ScanOptions};
use crate::names::DEFAULT_NCHECK_PROGRAM;
use crate::types::DEFAULT_ROOT_INODE;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "xfscan")]
#[command(author, version)]
#[command(about = "Scan an XFS filesystem image for inode metadata", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .multiple(false)
        .args(["allocated", "deleted", "shortform"])
))]
pub struct Cli {
    /// Path to XFS image file or device
    pub image_path: PathBuf,

    /// List only allocated inodes (inodes with type and all timestamps)
    #[arg(short, long)]
    pub allocated: bool,

    /// List only 'Probably Deleted File' inodes
    #[arg(short, long)]
    pub deleted: bool,

    /// Scan for short-form directory entries
    #[arg(short, long)]
    pub shortform: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Do not run xfs_ncheck for path names
    #[arg(long)]
    pub no_names: bool,

    /// Inode number reported as the root directory
    #[arg(long, default_value_t = DEFAULT_ROOT_INODE)]
    pub root_inode: u64,

    /// Program used to resolve inode numbers to paths
    #[arg(long, default_value = DEFAULT_NCHECK_PROGRAM)]
    pub ncheck_program: String,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> ScanMode {
        if self.allocated {
            ScanMode::AllocatedOnly
        } else if self.deleted {
            ScanMode::DeletedOnly
        } else if self.shortform {
            ScanMode::Shortform
        } else {
            ScanMode::All
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        let options = ScanOptions::new(&self.image_path)
            .with_mode(self.mode())
            .with_root_inode(self.root_inode)
            .with_ncheck_program(&self.ncheck_program);
        if self.no_names {
            options.without_names()
        } else {
            options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_default_mode_is_all() {
        let cli = Cli::try_parse_from(["xfscan", "disk.img"]).unwrap();
        assert_eq!(cli.mode(), ScanMode::All);
        let options = cli.scan_options();
        assert_eq!(options.image_path, PathBuf::from("disk.img"));
        assert_eq!(options.root_inode, 128);
        assert!(options.resolve_names);
    }

    #[test]
    fn test_single_mode_flags() {
        let cli = Cli::try_parse_from(["xfscan", "-a", "disk.img"]).unwrap();
        assert_eq!(cli.mode(), ScanMode::AllocatedOnly);
        let cli = Cli::try_parse_from(["xfscan", "--deleted", "disk.img"]).unwrap();
        assert_eq!(cli.mode(), ScanMode::DeletedOnly);
        let cli = Cli::try_parse_from(["xfscan", "disk.img", "-s"]).unwrap();
        assert_eq!(cli.mode(), ScanMode::Shortform);
    }

    #[test]
    fn test_mode_flags_are_mutually_exclusive() {
        for args in [
            ["xfscan", "-a", "-d", "disk.img"],
            ["xfscan", "-a", "-s", "disk.img"],
            ["xfscan", "-d", "-s", "disk.img"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        }
    }

    #[test]
    fn test_extra_options() {
        let cli = Cli::try_parse_from([
            "xfscan",
            "--json",
            "--no-names",
            "--root-inode",
            "64",
            "--ncheck-program",
            "/usr/sbin/xfs_ncheck",
            "disk.img",
        ])
        .unwrap();
        assert!(cli.json);
        let options = cli.scan_options();
        assert!(!options.resolve_names);
        assert_eq!(options.root_inode, 64);
        assert_eq!(options.ncheck_program, "/usr/sbin/xfs_ncheck");
    }

    #[test]
    fn test_image_path_is_required() {
        let err = Cli::try_parse_from(["xfscan", "-a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
