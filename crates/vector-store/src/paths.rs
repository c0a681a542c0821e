use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR_NAME: &str = "data";

/// Serialized vectors (binary, little-endian).
pub const INDEX_FILE_NAME: &str = "vectors.bin";
/// Serialized document texts (JSON).
pub const DOCUMENTS_FILE_NAME: &str = "documents.json";

#[must_use]
pub fn index_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(INDEX_FILE_NAME)
}

#[must_use]
pub fn documents_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(DOCUMENTS_FILE_NAME)
}

/// Sibling path a file is staged at before being renamed into place.
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_keeps_directory() {
        let path = Path::new("/srv/data").join(INDEX_FILE_NAME);
        assert_eq!(staging_path(&path), Path::new("/srv/data/vectors.bin.tmp"));
    }
}
