//! Collaborator seams for resource and filesystem access
//!
//! Both traits signal "not there" with `None`; the caller falls through to
//! its next source instead of failing.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Decoded halves of a fixed version-info block.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
pub struct VersionFields {
    pub file_version_ms: u32,
    pub file_version_ls: u32,
    pub product_version_ms: u32,
    pub product_version_ls: u32,
    pub file_date_ms: u32,
    pub file_date_ls: u32,
}

pub trait VersionResourceReader {
    /// Raw version and file-date halves from the embedded version resource.
    fn read_version_fields(&self, path: &Path) -> Option<VersionFields>;

    /// Link timestamp from the executable header, seconds since the Unix
    /// epoch.
    fn read_header_timestamp(&self, path: &Path) -> Option<u32>;
}

pub trait FileMetadataProvider {
    fn exists(&self, path: &Path) -> bool;

    fn last_modified(&self, path: &Path) -> Option<DateTime<Local>>;
}

/// Plain std::fs metadata.
pub struct FsMetadata;

impl FileMetadataProvider for FsMetadata {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn last_modified(&self, path: &Path) -> Option<DateTime<Local>> {
        let meta = fs::metadata(path).ok()?;
        let mtime = meta.modified().ok()?;
        Some(mtime.into())
    }
}
