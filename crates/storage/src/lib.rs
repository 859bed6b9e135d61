pub mod archive;
pub mod naming;

pub use archive::{save_archive, write_archive, ArchiveError, WorkArea};
pub use naming::{archive_file_name, artifact_file_name, file_stamp, sanitize_key, FILE_STAMP_FORMAT};
