use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::app::ports::ListingOutputPort;
use crate::domain::ListingRecord;

/// Writes cleaned listings as NDJSON, one object per line, to a file or stdout
pub struct JsonLinesOutputAdapter {
    writer: Box<dyn Write + Send>,
    written: usize,
}

impl JsonLinesOutputAdapter {
    pub fn to_file(file_path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = file_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        info!("Creating listing output file: {}", file_path.display());
        let file: File = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(file_path)
            .with_context(|| format!("Failed to open output file {}", file_path.display()))?;

        Ok(Self::from_writer(Box::new(BufWriter::new(file))))
    }

    pub fn to_stdout() -> Self {
        Self::from_writer(Box::new(BufWriter::new(io::stdout())))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl ListingOutputPort for JsonLinesOutputAdapter {
    fn write_listing(&mut self, record: &ListingRecord) -> anyhow::Result<()> {
        let json_line = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json_line)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps cleaned listings in memory
#[derive(Debug, Default)]
pub struct MemoryOutputAdapter {
    pub records: Vec<ListingRecord>,
}

impl ListingOutputPort for MemoryOutputAdapter {
    fn write_listing(&mut self, record: &ListingRecord) -> anyhow::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
