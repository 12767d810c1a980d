//! Executable header and version resource parsing
//!
//! Everything is read straight out of the image, so this works on any host
//! and needs no platform version APIs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zerocopy::FromBytes;
use zerocopy_derive::{AsBytes, FromBytes, FromZeroes};

use crate::res::{VersionFields, VersionResourceReader};

const DOS_MAGIC: &[u8] = b"MZ";
const PE_MAGIC: &[u8] = b"PE\0\0";

// offset of the PE header pointer (e_lfanew) in the DOS header
const LFANEW_OFFSET: usize = 0x3c;

/// Signature of the fixed version-info block.
pub const FIXED_INFO_MAGIC: u32 = 0xfeef_04bd;

#[derive(AsBytes, FromBytes, FromZeroes, Serialize, Deserialize, Clone, Copy, Debug)]
#[repr(C)]
pub struct CoffHeader {
    pub machine: u16,
    pub n_sections: u16,
    pub time_date_stamp: u32,
    pub symtab_offset: u32,
    pub n_symbols: u32,
    pub opt_header_size: u16,
    pub characteristics: u16,
}

#[derive(AsBytes, FromBytes, FromZeroes, Serialize, Deserialize, Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct FixedFileInfo {
    pub signature: u32,
    pub struc_version: u32,
    pub file_version_ms: u32,
    pub file_version_ls: u32,
    pub product_version_ms: u32,
    pub product_version_ls: u32,
    pub file_flags_mask: u32,
    pub file_flags: u32,
    pub file_os: u32,
    pub file_type: u32,
    pub file_subtype: u32,
    pub file_date_ms: u32,
    pub file_date_ls: u32,
}

const FIXED_INFO_SIZE: usize = core::mem::size_of::<FixedFileInfo>();

impl From<FixedFileInfo> for VersionFields {
    fn from(i: FixedFileInfo) -> Self {
        VersionFields {
            file_version_ms: i.file_version_ms,
            file_version_ls: i.file_version_ls,
            product_version_ms: i.product_version_ms,
            product_version_ls: i.product_version_ls,
            file_date_ms: i.file_date_ms,
            file_date_ls: i.file_date_ls,
        }
    }
}

/// Link timestamp from the COFF header. A zeroed field counts as not
/// present; reproducible builds commonly blank it.
pub fn read_coff_timestamp(data: &[u8]) -> Option<u32> {
    if data.get(..2)? != DOS_MAGIC {
        return None;
    }
    let lfanew = u32::read_from_prefix(data.get(LFANEW_OFFSET..)?)? as usize;
    if data.get(lfanew..lfanew + 4)? != PE_MAGIC {
        return None;
    }
    let coff = CoffHeader::read_from_prefix(data.get(lfanew + 4..)?)?;
    if coff.time_date_stamp == 0 {
        return None;
    }
    Some(coff.time_date_stamp)
}

/// Scan the image for the fixed version-info block by its signature.
/// The block sits 32-bit aligned inside the resource section.
pub fn find_fixed_info(data: &[u8]) -> Option<FixedFileInfo> {
    let end = data.len().checked_sub(FIXED_INFO_SIZE)?;
    for pos in (0..=end).step_by(4) {
        if u32::read_from_prefix(&data[pos..]) != Some(FIXED_INFO_MAGIC) {
            continue;
        }
        let info = FixedFileInfo::read_from_prefix(&data[pos..])?;
        // the structure version's high word is 1 for every known block
        if info.struc_version >> 16 == 1 {
            return Some(info);
        }
    }
    None
}

/// Version resource access backed by plain file reads.
pub struct PeFile;

impl VersionResourceReader for PeFile {
    fn read_version_fields(&self, path: &Path) -> Option<VersionFields> {
        let data = fs::read(path).ok()?;
        find_fixed_info(&data).map(VersionFields::from)
    }

    fn read_header_timestamp(&self, path: &Path) -> Option<u32> {
        let data = fs::read(path).ok()?;
        read_coff_timestamp(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zerocopy::AsBytes;

    fn coff(ts: u32) -> CoffHeader {
        CoffHeader {
            machine: 0x8664,
            n_sections: 3,
            time_date_stamp: ts,
            symtab_offset: 0,
            n_symbols: 0,
            opt_header_size: 240,
            characteristics: 0x22,
        }
    }

    fn fixed_info(date_ms: u32, date_ls: u32) -> FixedFileInfo {
        FixedFileInfo {
            signature: FIXED_INFO_MAGIC,
            struc_version: 0x0001_0000,
            file_version_ms: 0x0001_0002,
            file_version_ls: 0x0003_0004,
            product_version_ms: 0x0005_0006,
            product_version_ls: 0x0007_0008,
            file_flags_mask: 0x3f,
            file_flags: 0,
            file_os: 0x4_0004,
            file_type: 1,
            file_subtype: 0,
            file_date_ms: date_ms,
            file_date_ls: date_ls,
        }
    }

    // DOS stub, PE signature at 0x40, COFF header right behind it
    fn pe_image(ts: u32) -> Vec<u8> {
        let mut data = vec![0u8; 0x44];
        data[..2].copy_from_slice(b"MZ");
        data[LFANEW_OFFSET..LFANEW_OFFSET + 4].copy_from_slice(&0x40u32.to_le_bytes());
        data[0x40..0x44].copy_from_slice(b"PE\0\0");
        data.extend_from_slice(coff(ts).as_bytes());
        data
    }

    #[test]
    fn coff_timestamp() {
        let data = pe_image(1_600_000_000);
        assert_eq!(read_coff_timestamp(&data), Some(1_600_000_000));
    }

    #[test]
    fn zeroed_coff_timestamp_is_absent() {
        let data = pe_image(0);
        assert_eq!(read_coff_timestamp(&data), None);
    }

    #[test]
    fn rejects_non_executables() {
        assert_eq!(read_coff_timestamp(&[]), None);
        assert_eq!(read_coff_timestamp(b"\x7fELF headers go elsewhere"), None);
        // MZ but truncated before the header pointer
        assert_eq!(read_coff_timestamp(b"MZ\x90\x00"), None);
        // header pointer leads outside the image
        let mut data = pe_image(1);
        data[LFANEW_OFFSET..LFANEW_OFFSET + 4].copy_from_slice(&0xffff_0000u32.to_le_bytes());
        assert_eq!(read_coff_timestamp(&data), None);
    }

    #[test]
    fn finds_fixed_info() {
        let mut data = vec![0u8; 0x200];
        let info = fixed_info(0x00aa_bbcc, 0x1122_3344);
        data[0x80..0x80 + FIXED_INFO_SIZE].copy_from_slice(info.as_bytes());
        let found = find_fixed_info(&data).unwrap();
        assert_eq!(found.file_version_ms, 0x0001_0002);
        assert_eq!(found.product_version_ls, 0x0007_0008);
        assert_eq!(found.file_date_ms, 0x00aa_bbcc);
        assert_eq!(found.file_date_ls, 0x1122_3344);
    }

    #[test]
    fn signature_without_sane_version_is_skipped() {
        let mut data = vec![0u8; 0x200];
        let mut bogus = fixed_info(0, 0);
        bogus.struc_version = 0xdead_0000;
        data[0x40..0x40 + FIXED_INFO_SIZE].copy_from_slice(bogus.as_bytes());
        assert!(find_fixed_info(&data).is_none());

        // a good block further in is still found
        data[0x100..0x100 + FIXED_INFO_SIZE].copy_from_slice(fixed_info(0, 0).as_bytes());
        assert!(find_fixed_info(&data).is_some());
    }

    #[test]
    fn empty_image_has_no_fixed_info() {
        assert!(find_fixed_info(&[]).is_none());
        assert!(find_fixed_info(&[0u8; 16]).is_none());
    }

    #[test]
    fn reader_reads_both_blocks_from_a_file() {
        let mut data = pe_image(1_600_000_000);
        // resource data behind the headers, keeping the 4-byte alignment
        while data.len() % 4 != 0 {
            data.push(0);
        }
        data.extend_from_slice(fixed_info(0, 0).as_bytes());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();

        let fields = PeFile.read_version_fields(f.path()).unwrap();
        assert_eq!(fields.file_version_ms, 0x0001_0002);
        assert_eq!(fields.file_date_ms, 0);
        assert_eq!(PeFile.read_header_timestamp(f.path()), Some(1_600_000_000));
    }

    #[test]
    fn reader_signals_absence_for_missing_file() {
        let p = Path::new("/no/such/binary.exe");
        assert!(PeFile.read_version_fields(p).is_none());
        assert!(PeFile.read_header_timestamp(p).is_none());
    }
}
