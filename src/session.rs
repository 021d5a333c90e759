//! One scan of one image.
//!
//! The superblock check gates everything. Both scan modes run it first
//! and return [`ScanOutcome::NotXfs`] without touching the rest of the
//! image when the magic is missing.

use crate::classify::InodeClassifier;
use crate::config::ScanOptions;
use crate::error::Result;
use crate::io::{DiskReader, ImageSource};
use crate::names::{NameResolver, NcheckResolver, NoNames};
use crate::report::{InodeEntry, InodeReport};
use crate::scanner::scan_inodes;
use crate::shortform::scan_shortform;
use crate::superblock::detect_xfs_magic;
use crate::types::ShortformInodeRecord;

/// What a gated scan produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The superblock magic was missing; nothing was scanned.
    NotXfs,
    Inodes(InodeReport),
    /// Number of short-form directory inodes handed to the callback.
    Shortform(usize),
}

impl ScanOutcome {
    pub fn is_xfs(&self) -> bool {
        !matches!(self, ScanOutcome::NotXfs)
    }

    pub fn into_report(self) -> Option<InodeReport> {
        match self {
            ScanOutcome::Inodes(report) => Some(report),
            _ => None,
        }
    }
}

pub struct ScanSession<S: ImageSource = DiskReader> {
    options: ScanOptions,
    source: S,
    xfs: Option<bool>,
}

impl ScanSession<DiskReader> {
    /// Opens the image named in `options` read-only.
    pub fn open(options: ScanOptions) -> Result<Self> {
        let source = DiskReader::open(&options.image_path)?;
        Ok(Self::with_source(options, source))
    }
}

impl<S: ImageSource> ScanSession<S> {
    pub fn with_source(options: ScanOptions, source: S) -> Self {
        Self {
            options,
            source,
            xfs: None,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Checks the superblock magic. The answer is remembered, so the
    /// image is only read once per session.
    pub fn is_xfs(&mut self) -> Result<bool> {
        if let Some(found) = self.xfs {
            return Ok(found);
        }
        let found = detect_xfs_magic(&mut self.source)?;
        self.xfs = Some(found);
        if found {
            tracing::info!(path = %self.options.image_path.display(), "XFS superblock found");
        } else {
            tracing::info!(path = %self.options.image_path.display(), "no XFS superblock magic");
        }
        Ok(found)
    }

    /// The resolver implied by the options.
    pub fn default_resolver(&self) -> Box<dyn NameResolver> {
        if self.options.resolve_names {
            Box::new(NcheckResolver::new(self.options.ncheck_program.clone()))
        } else {
            Box::new(NoNames)
        }
    }

    /// Scans, classifies and filters inode records.
    ///
    /// Names are only requested when at least one record was found.
    pub fn inspect_inodes(&mut self, resolver: &dyn NameResolver) -> Result<ScanOutcome> {
        if !self.is_xfs()? {
            return Ok(ScanOutcome::NotXfs);
        }

        let records = scan_inodes(&mut self.source)?;
        if records.is_empty() {
            return Ok(ScanOutcome::Inodes(InodeReport::default()));
        }

        let names = resolver.resolve(&self.options.image_path);
        let classifier = InodeClassifier::new(self.options.root_inode);
        let filter = self.options.mode.report_filter().unwrap_or_default();

        let entries: Vec<InodeEntry> = classifier
            .classify(&records)
            .into_iter()
            .filter(|c| filter.accepts(c))
            .map(|c| InodeEntry::named(c, self.options.root_inode, &names))
            .collect();

        tracing::info!(
            scanned = records.len(),
            reported = entries.len(),
            mode = ?self.options.mode,
            "inode report ready"
        );

        Ok(ScanOutcome::Inodes(InodeReport {
            scanned: records.len(),
            entries,
        }))
    }

    /// Runs the short-form search over the whole image, handing each
    /// record to `on_record` as it is found.
    pub fn locate_shortform<F>(&mut self, mut on_record: F) -> Result<ScanOutcome>
    where
        F: FnMut(&ShortformInodeRecord) -> std::io::Result<()>,
    {
        if !self.is_xfs()? {
            return Ok(ScanOutcome::NotXfs);
        }

        let image = self.source.load_all()?;
        let mut found = 0;
        for record in scan_shortform(&image) {
            on_record(&record)?;
            found += 1;
        }

        tracing::info!(found, "short-form search complete");
        Ok(ScanOutcome::Shortform(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanMode;
    use crate::names::NameMap;
    use crate::types::ClassificationLabel;
    use std::io::Cursor;
    use std::path::Path;

    struct FixedNames(NameMap);

    impl NameResolver for FixedNames {
        fn resolve(&self, _image_path: &Path) -> NameMap {
            self.0.clone()
        }
    }

    fn image_with_inodes(inodes: &[(u64, u8, u32)]) -> Vec<u8> {
        let last = inodes.iter().map(|i| i.0).max().unwrap_or(0);
        let mut image = vec![0u8; (last as usize + 1) * 512];
        image[..4].copy_from_slice(b"XFSB");
        for &(inode, mode, t) in inodes {
            let base = inode as usize * 512;
            image[base..base + 2].copy_from_slice(b"IN");
            image[base + 2] = mode;
            for off in [32, 40, 48] {
                image[base + off..base + off + 4].copy_from_slice(&t.to_be_bytes());
            }
        }
        image
    }

    #[test]
    fn test_names_flow_into_report() {
        let image = image_with_inodes(&[(1, 0x41, 10), (2, 0x81, 10), (3, 0x00, 10)]);
        let mut session =
            ScanSession::with_source(ScanOptions::new("mem.img"), Cursor::new(image));
        assert!(session.is_xfs().unwrap());

        let mut names = NameMap::new();
        names.insert(2, "./a.txt".to_string());
        let report = session
            .inspect_inodes(&FixedNames(names))
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.entries[1].name, "./a.txt");
        assert_eq!(report.entries[0].name, "(unknown)");
        assert_eq!(report.entries[2].inode.label, ClassificationLabel::ProbablyDeleted);
    }

    #[test]
    fn test_deleted_mode_filters_report() {
        let image = image_with_inodes(&[(1, 0x41, 10), (2, 0x00, 10), (3, 0x81, 10)]);
        let options = ScanOptions::new("mem.img").with_mode(ScanMode::DeletedOnly);
        let mut session = ScanSession::with_source(options, Cursor::new(image));

        let report = session.inspect_inodes(&NoNames).unwrap().into_report().unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.entries[0].inode.inode_number(), 2);
    }

    #[test]
    fn test_resolver_not_consulted_without_records() {
        struct Panicking;
        impl NameResolver for Panicking {
            fn resolve(&self, _image_path: &Path) -> NameMap {
                panic!("resolver must not run when no inodes were found");
            }
        }

        let mut image = b"XFSB".to_vec();
        image.resize(2048, 0);
        let mut session =
            ScanSession::with_source(ScanOptions::new("mem.img"), Cursor::new(image));
        let report = session.inspect_inodes(&Panicking).unwrap().into_report().unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_shortform_records_stream_to_callback() {
        let mut image = vec![0u8; 2048];
        image[..4].copy_from_slice(b"XFSB");
        image[768..770].copy_from_slice(b"IN");
        image[768 + 152..768 + 160].copy_from_slice(&131u64.to_be_bytes());
        image[768 + 176] = 2;

        let options = ScanOptions::new("mem.img").with_mode(ScanMode::Shortform);
        let mut session = ScanSession::with_source(options, Cursor::new(image));
        let mut seen = Vec::new();
        let outcome = session
            .locate_shortform(|r| {
                seen.push(*r);
                Ok(())
            })
            .unwrap();

        assert_eq!(outcome, ScanOutcome::Shortform(1));
        assert_eq!(seen[0].inode_number, 131);
        assert_eq!(seen[0].physical_offset, 768);
    }

    #[test]
    fn test_not_xfs_image_is_never_scanned() {
        let mut image = image_with_inodes(&[(1, 0x81, 10), (2, 0x41, 10)]);
        image[..4].copy_from_slice(b"XFSX");
        let mut session =
            ScanSession::with_source(ScanOptions::new("mem.img"), Cursor::new(image));

        struct Panicking;
        impl NameResolver for Panicking {
            fn resolve(&self, _image_path: &Path) -> NameMap {
                panic!("resolver must not run on a non-XFS image");
            }
        }

        let outcome = session.inspect_inodes(&Panicking).unwrap();
        assert_eq!(outcome, ScanOutcome::NotXfs);
        assert!(!outcome.is_xfs());
        assert!(outcome.into_report().is_none());
    }

    #[test]
    fn test_not_xfs_image_skips_shortform_search() {
        let mut image = vec![0u8; 2048];
        image[512..514].copy_from_slice(b"IN");
        image[512 + 152..512 + 160].copy_from_slice(&131u64.to_be_bytes());
        image[512 + 176] = 2;

        let options = ScanOptions::new("mem.img").with_mode(ScanMode::Shortform);
        let mut session = ScanSession::with_source(options, Cursor::new(image));
        let outcome = session
            .locate_shortform(|_| panic!("no record may be reported"))
            .unwrap();
        assert_eq!(outcome, ScanOutcome::NotXfs);
    }

    #[test]
    fn test_superblock_check_is_remembered() {
        let image = image_with_inodes(&[(1, 0x81, 10)]);
        let mut session =
            ScanSession::with_source(ScanOptions::new("mem.img"), Cursor::new(image));
        assert!(session.is_xfs().unwrap());
        assert!(session.is_xfs().unwrap());
        assert!(session.inspect_inodes(&NoNames).unwrap().is_xfs());
    }

    #[test]
    fn test_default_resolver_respects_options() {
        let session = ScanSession::with_source(
            ScanOptions::new("mem.img").without_names(),
            Cursor::new(Vec::<u8>::new()),
        );
        assert!(session.default_resolver().resolve(Path::new("mem.img")).is_empty());
    }
}
