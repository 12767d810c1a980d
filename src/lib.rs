pub mod packed;
pub mod pe;
pub mod record;
pub mod res;

pub use packed::PackedVersion;
pub use record::VersionRecord;
pub use res::{FileMetadataProvider, FsMetadata, VersionFields, VersionResourceReader};
