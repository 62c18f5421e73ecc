//! Archive access and extraction.
//!
//! Each year is published as a zip archive holding a single pipe-delimited
//! text file. `ArchiveSource` abstracts where the archive bytes come from so
//! the ingestion stage can run against in-memory fixtures.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use crate::error::AppError;

/// Supplies the raw archive bytes for a year.
pub trait ArchiveSource {
    fn fetch(&self, year: i32) -> Result<Vec<u8>, AppError>;
}

/// In-memory archives keyed by year.
#[derive(Debug, Clone, Default)]
pub struct StaticArchiveSource {
    archives: HashMap<i32, Vec<u8>>,
}

impl StaticArchiveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, bytes: Vec<u8>) {
        self.archives.insert(year, bytes);
    }
}

impl ArchiveSource for StaticArchiveSource {
    fn fetch(&self, year: i32) -> Result<Vec<u8>, AppError> {
        self.archives
            .get(&year)
            .cloned()
            .ok_or_else(|| AppError::fetch(format!("No archive available for {year}.")))
    }
}

/// Extract the first file of a zip archive.
///
/// Returns the entry name and its decompressed content.
pub fn extract_first_entry(bytes: &[u8]) -> Result<(String, Vec<u8>), AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::fetch(format!("Invalid zip archive: {e}")))?;

    if archive.is_empty() {
        return Err(AppError::fetch("Zip archive contains no files."));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| AppError::fetch(format!("Failed to open archive entry: {e}")))?;
    let name = entry.name().to_string();

    // The declared size comes from the archive itself and is not trusted.
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| AppError::fetch(format!("Failed to extract '{name}': {e}")))?;

    Ok((name, content))
}

/// Build a single-entry, uncompressed zip archive.
#[cfg(test)]
pub(crate) fn zip_single(name: &str, content: &[u8]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.start_file(name, options).unwrap();
    writer.write_all(content).unwrap();
    writer.finish().unwrap().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_contained_file() {
        let bytes = zip_single("drp_2023.txt", b"a|b|c\n");
        let (name, content) = extract_first_entry(&bytes).unwrap();
        assert_eq!(name, "drp_2023.txt");
        assert_eq!(content, b"a|b|c\n");
    }

    #[test]
    fn declared_size_does_not_drive_extraction() {
        let payload = b"1|2|3\n".repeat(50);
        let mut bytes = zip_single("drp_2023.txt", &payload);
        // Inflate the uncompressed size in the central directory record.
        let cd = bytes
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        bytes[cd + 24..cd + 28].copy_from_slice(&0x7fff_fff0u32.to_le_bytes());

        match extract_first_entry(&bytes) {
            Ok((_, content)) => assert_eq!(content, payload),
            Err(err) => assert_eq!(err.exit_code(), crate::error::EXIT_FETCH),
        }
    }

    #[test]
    fn garbage_is_a_fetch_error() {
        let err = extract_first_entry(b"definitely not a zip").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_FETCH);
    }

    #[test]
    fn static_source_misses_unknown_years() {
        let mut source = StaticArchiveSource::new();
        source.insert(2020, vec![1, 2, 3]);
        assert_eq!(source.fetch(2020).unwrap(), vec![1, 2, 3]);
        assert!(source.fetch(2021).is_err());
    }
}
