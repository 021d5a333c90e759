//! Labels scanned inode records.
//!
//! Classification looks at a record and its immediate neighbors in scan
//! order, so it runs over the fully materialized record list rather than
//! a stream.

use crate::types::{ClassificationLabel, DEFAULT_ROOT_INODE, FileType, InodeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedInode {
    pub record: InodeRecord,
    pub label: ClassificationLabel,
    pub has_times: bool,
}

impl ClassifiedInode {
    #[inline]
    pub fn inode_number(&self) -> u64 {
        self.record.inode_number()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InodeClassifier {
    root_inode: u64,
}

impl Default for InodeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_INODE)
    }
}

impl InodeClassifier {
    pub fn new(root_inode: u64) -> Self {
        Self { root_inode }
    }

    pub fn root_inode(&self) -> u64 {
        self.root_inode
    }

    /// Labels `records[index]`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn classify_at(&self, records: &[InodeRecord], index: usize) -> ClassificationLabel {
        let record = &records[index];

        if record.inode_number() == self.root_inode {
            return ClassificationLabel::RootDirectory;
        }

        if record.type_code == 0x0 {
            let prev_known = index
                .checked_sub(1)
                .and_then(|i| records.get(i))
                .is_some_and(|r| FileType::is_known_code(r.type_code));
            let next_known = records
                .get(index + 1)
                .is_some_and(|r| FileType::is_known_code(r.type_code));

            return if (prev_known || next_known) && record.has_times() {
                ClassificationLabel::ProbablyDeleted
            } else {
                ClassificationLabel::Unknown
            };
        }

        ClassificationLabel::KnownType(record.file_type())
    }

    pub fn classify(&self, records: &[InodeRecord]) -> Vec<ClassifiedInode> {
        let classified: Vec<ClassifiedInode> = records
            .iter()
            .enumerate()
            .map(|(i, record)| ClassifiedInode {
                record: *record,
                label: self.classify_at(records, i),
                has_times: record.has_times(),
            })
            .collect();

        let deleted = classified
            .iter()
            .filter(|c| c.label == ClassificationLabel::ProbablyDeleted)
            .count();
        tracing::debug!(total = classified.len(), deleted, "classified inode records");

        classified
    }
}

/// Which classified records make it into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    #[default]
    All,
    /// Drops records with type code 0 or any missing timestamp.
    AllocatedOnly,
    /// Keeps only records labeled probably deleted.
    DeletedOnly,
}

impl ReportFilter {
    pub fn accepts(&self, inode: &ClassifiedInode) -> bool {
        match self {
            ReportFilter::All => true,
            ReportFilter::AllocatedOnly => inode.record.type_code != 0 && inode.has_times,
            ReportFilter::DeletedOnly => inode.label == ClassificationLabel::ProbablyDeleted,
        }
    }

    pub fn apply(&self, classified: Vec<ClassifiedInode>) -> Vec<ClassifiedInode> {
        classified.into_iter().filter(|c| self.accepts(c)).collect()
    }
}
