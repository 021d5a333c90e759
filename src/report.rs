//! Text and JSON rendering of scan results.

use crate::classify::ClassifiedInode;
use crate::names::NameMap;
use crate::types::ShortformInodeRecord;
use chrono::DateTime;
use serde::Serialize;
use std::io::{self, Write};

pub const ROOT_NAME: &str = ".";
pub const UNKNOWN_NAME: &str = "(unknown)";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats Unix epoch seconds as a UTC timestamp.
pub fn format_time(epoch: u32) -> String {
    DateTime::from_timestamp(i64::from(epoch), 0)
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "Invalid".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeEntry {
    pub inode: ClassifiedInode,
    pub name: String,
}

impl InodeEntry {
    /// Pairs `inode` with its path name. The root inode is always `.`.
    pub fn named(inode: ClassifiedInode, root_inode: u64, names: &NameMap) -> Self {
        let number = inode.inode_number();
        let name = if number == root_inode {
            ROOT_NAME.to_string()
        } else {
            names
                .get(&number)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string())
        };
        Self { inode, name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InodeReport {
    /// Inode records found before filtering
    pub scanned: usize,
    pub entries: Vec<InodeEntry>,
}

impl InodeReport {
    /// Number of reported inodes.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanned == 0
    }
}

#[derive(Debug, Serialize)]
struct InodeJson<'a> {
    inode: u64,
    physical_offset: u64,
    type_code: u8,
    file_type: String,
    name: &'a str,
    has_times: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    atime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctime: Option<String>,
}

impl<'a> From<&'a InodeEntry> for InodeJson<'a> {
    fn from(entry: &'a InodeEntry) -> Self {
        let record = &entry.inode.record;
        let times = entry.inode.has_times;
        Self {
            inode: record.inode_number(),
            physical_offset: record.physical_offset,
            type_code: record.type_code,
            file_type: entry.inode.label.to_string(),
            name: &entry.name,
            has_times: times,
            atime: times.then(|| format_time(record.atime)),
            mtime: times.then(|| format_time(record.mtime)),
            ctime: times.then(|| format_time(record.ctime)),
        }
    }
}

#[derive(Debug, Serialize)]
struct InodeReportJson<'a> {
    scanned: usize,
    total: usize,
    inodes: Vec<InodeJson<'a>>,
}

pub fn write_inode_entry<W: Write>(out: &mut W, entry: &InodeEntry) -> io::Result<()> {
    let record = &entry.inode.record;
    let label = entry.inode.label.to_string();
    writeln!(
        out,
        "Inode #{:<7} | File Type: {:<22} | Name: {}",
        record.inode_number(),
        label,
        entry.name
    )?;
    if entry.inode.has_times {
        writeln!(out, "  atime: {}", format_time(record.atime))?;
        writeln!(out, "  mtime: {}", format_time(record.mtime))?;
        writeln!(out, "  ctime: {}", format_time(record.ctime))?;
    }
    Ok(())
}

pub fn write_inode_report<W: Write>(out: &mut W, report: &InodeReport) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "No inodes found.");
    }
    for entry in &report.entries {
        write_inode_entry(out, entry)?;
    }
    writeln!(out, "\nTotal inodes found: {}", report.total())
}

pub fn write_inode_report_json<W: Write>(out: &mut W, report: &InodeReport) -> io::Result<()> {
    let doc = InodeReportJson {
        scanned: report.scanned,
        total: report.total(),
        inodes: report.entries.iter().map(InodeJson::from).collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)
}

pub fn write_shortform_record<W: Write>(
    out: &mut W,
    record: &ShortformInodeRecord,
) -> io::Result<()> {
    writeln!(out, "Inode #{}", record.inode_number)?;
    writeln!(out, "  Physical Offset To The Inode: {}", record.physical_offset)?;
    writeln!(out, "  Total short-form entries: {}\n", record.entry_count)
}

/// One JSON object per line, so records can be written as they are found.
pub fn write_shortform_record_json<W: Write>(
    out: &mut W,
    record: &ShortformInodeRecord,
) -> io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)
}
