use core::cmp::Ordering;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::packed::PackedVersion;
use crate::pe::PeFile;
use crate::res::{FileMetadataProvider, FsMetadata, VersionFields, VersionResourceReader};

// 1601-01-01 to 1970-01-01 in seconds
const FILETIME_UNIX_DIFF: i64 = 11_644_473_600;

/// Decode a low/high-dword file time (100 ns ticks since 1601) to local
/// time.
pub fn filetime_to_local(ms: u32, ls: u32) -> Option<DateTime<Local>> {
    let ticks = (ms as u64) << 32 | ls as u64;
    let secs = (ticks / 10_000_000) as i64 - FILETIME_UNIX_DIFF;
    let nanos = (ticks % 10_000_000) as u32 * 100;
    let t = DateTime::from_timestamp(secs, nanos)?;
    Some(t.with_timezone(&Local))
}

/// Seconds since the Unix epoch to local time.
pub fn unix_to_local(secs: u32) -> Option<DateTime<Local>> {
    let t = DateTime::from_timestamp(secs as i64, 0)?;
    Some(t.with_timezone(&Local))
}

/// Version metadata of one binary: both packed version numbers plus the
/// resolved build time, `None` when no source could tell.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
pub struct VersionRecord {
    pub file_version: PackedVersion,
    pub product_version: PackedVersion,
    build_time: Option<DateTime<Local>>,
}

impl VersionRecord {
    pub fn new(file_version: u64, product_version: u64, build_time: Option<DateTime<Local>>) -> Self {
        Self {
            file_version: PackedVersion::from_raw(file_version),
            product_version: PackedVersion::from_raw(product_version),
            build_time,
        }
    }

    /// Best-effort extraction: a missing file, absent resource or unset
    /// header field each fall through to the next source, never out to the
    /// caller.
    pub fn from_path<R, M>(path: &Path, reader: &R, meta: &M) -> Self
    where
        R: VersionResourceReader,
        M: FileMetadataProvider,
    {
        if path.as_os_str().is_empty() || !meta.exists(path) {
            return Self::default();
        }

        let fields = reader.read_version_fields(path);
        let (file_version, product_version) = match &fields {
            Some(f) => (
                PackedVersion::from_dwords(f.file_version_ms, f.file_version_ls),
                PackedVersion::from_dwords(f.product_version_ms, f.product_version_ls),
            ),
            None => (PackedVersion::default(), PackedVersion::default()),
        };
        let build_time = resolve_build_time(path, fields.as_ref(), reader, meta);

        Self {
            file_version,
            product_version,
            build_time,
        }
    }

    pub fn from_file(path: &Path) -> Self {
        Self::from_path(path, &PeFile, &FsMetadata)
    }

    pub fn build_time(&self) -> Option<DateTime<Local>> {
        self.build_time
    }

    pub fn cmp_file_version(&self, other: &Self) -> Ordering {
        self.file_version.cmp(&other.file_version)
    }

    pub fn cmp_product_version(&self, other: &Self) -> Ordering {
        self.product_version.cmp(&other.product_version)
    }
}

// Resource file date, then the header link timestamp, then the mtime.
// Each source is only consulted when the one before it had nothing.
fn resolve_build_time<R, M>(
    path: &Path,
    fields: Option<&VersionFields>,
    reader: &R,
    meta: &M,
) -> Option<DateTime<Local>>
where
    R: VersionResourceReader,
    M: FileMetadataProvider,
{
    if let Some(f) = fields {
        if f.file_date_ms != 0 && f.file_date_ls != 0 {
            if let Some(t) = filetime_to_local(f.file_date_ms, f.file_date_ls) {
                return Some(t);
            }
        }
    }
    if let Some(secs) = reader.read_header_timestamp(path) {
        if let Some(t) = unix_to_local(secs) {
            return Some(t);
        }
    }
    meta.last_modified(path)
}
