use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressionFormat {
    Gzip,
    None,
}

impl CompressionFormat {
    pub fn from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".gz") {
            CompressionFormat::Gzip
        } else {
            CompressionFormat::None
        }
    }
}

/// Opens a trace for line-by-line reading, decompressing `.gz` on the fly.
pub fn open_trace(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    match CompressionFormat::from_path(path) {
        CompressionFormat::Gzip => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        CompressionFormat::None => Ok(Box::new(BufReader::new(file))),
    }
}
