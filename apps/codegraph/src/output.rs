//! # Quad Output Streams
//!
//! Where N-Quads go: stdout, a file, or a gzip-compressed file when the path
//! ends in `.gz`. Input files follow the same suffix rule.

use codegraph_core::CodegraphError;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// A writable quad destination.
pub enum QuadOutput {
    Stdout(BufWriter<io::Stdout>),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl std::fmt::Debug for QuadOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stdout(_) => "QuadOutput::Stdout",
            Self::File(_) => "QuadOutput::File",
            Self::Gzip(_) => "QuadOutput::Gzip",
        })
    }
}

impl QuadOutput {
    /// Open `path`, or stdout when `None`.
    pub fn open(path: Option<&Path>) -> Result<Self, CodegraphError> {
        let Some(path) = path else {
            return Ok(Self::Stdout(BufWriter::new(io::stdout())));
        };
        let file = File::create(path).map_err(|e| {
            CodegraphError::Io(format!("Cannot create '{}': {}", path.display(), e))
        })?;
        let file = BufWriter::new(file);
        if is_gzip(path) {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::File(file))
        }
    }

    /// Close the stream: the gzip trailer is written first, then the file
    /// buffer is flushed.
    pub fn finish(self) -> Result<(), CodegraphError> {
        match self {
            Self::Stdout(mut out) => out.flush()?,
            Self::File(mut file) => file.flush()?,
            Self::Gzip(gz) => gz.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for QuadOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File(file) => file.write(buf),
            Self::Gzip(gz) => gz.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File(file) => file.flush(),
            Self::Gzip(gz) => gz.flush(),
        }
    }
}

/// Open an N-Quads input, decompressing `.gz` files.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, CodegraphError> {
    let file = File::open(path)
        .map_err(|e| CodegraphError::Io(format!("Cannot open '{}': {}", path.display(), e)))?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
