use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::debug;

use crate::error::SinkError;
use crate::snapshot::SnapshotRecord;

pub const VEHICLE_ENTITY: &str = "transit_vehicles";

/// Receives one batch of records per simulation step.
pub trait SnapshotSink {
    fn write_batch(
        &mut self,
        time: NaiveDateTime,
        records: &[SnapshotRecord],
    ) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Writes each batch to its own file below an hourly `year=/month=/day=/hour=` partition.
pub struct PartitionedFileSink {
    root: PathBuf,
    entity: String,
    format: OutputFormat,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl PartitionedFileSink {
    pub fn new(root: impl Into<PathBuf>, entity: &str, format: OutputFormat) -> Self {
        PartitionedFileSink {
            root: root.into(),
            entity: entity.to_string(),
            format,
        }
    }

    pub fn entity_dir(&self) -> PathBuf {
        self.root.join(&self.entity)
    }

    pub fn partition_path(&self, time: NaiveDateTime) -> PathBuf {
        self.entity_dir()
            .join(time.format("year=%Y").to_string())
            .join(time.format("month=%m").to_string())
            .join(time.format("day=%d").to_string())
            .join(time.format("hour=%H").to_string())
            .join(format!(
                "{}_{}.{}",
                self.entity,
                time.format("%Y%m%d_%H%M%S"),
                self.format.extension()
            ))
    }

    fn write_file(&self, path: &Path, records: &[SnapshotRecord]) -> Result<(), SinkError> {
        let file = File::create(path).map_err(io_error(path))?;
        let mut out = BufWriter::new(file);
        match self.format {
            OutputFormat::Json => serde_json::to_writer_pretty(&mut out, records)?,
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut out);
                for record in records {
                    writer.serialize(record)?;
                }
                writer.flush().map_err(io_error(path))?;
            }
        }
        out.flush().map_err(io_error(path))
    }
}

impl SnapshotSink for PartitionedFileSink {
    fn write_batch(
        &mut self,
        time: NaiveDateTime,
        records: &[SnapshotRecord],
    ) -> Result<(), SinkError> {
        let path = self.partition_path(time);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error(dir))?;
        }

        // Readers only ever see complete files.
        let partial = path.with_extension(format!("{}.partial", self.format.extension()));
        let result = self
            .write_file(&partial, records)
            .and_then(|_| fs::rename(&partial, &path).map_err(io_error(&path)));
        if result.is_err() {
            let _ = fs::remove_file(&partial);
        }
        result?;

        debug!("Data saved to {}", path.display());
        Ok(())
    }
}

/// Keeps every batch in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<(NaiveDateTime, Vec<SnapshotRecord>)>,
}

impl SnapshotSink for MemorySink {
    fn write_batch(
        &mut self,
        time: NaiveDateTime,
        records: &[SnapshotRecord],
    ) -> Result<(), SinkError> {
        self.batches.push((time, records.to_vec()));
        Ok(())
    }
}
