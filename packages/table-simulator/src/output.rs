//! Output writers for simulation results.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::metrics::{CsvSummaryRow, GameMetrics};
use crate::types::OutputFormat;

pub struct OutputWriter {
    jsonl_writer: Option<Box<dyn Write + Send>>,
    csv_writer: Option<csv::Writer<BufWriter<File>>>,
    jsonl_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
}

fn create_truncated(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

impl OutputWriter {
    pub fn new(
        output_dir: &str,
        format: &OutputFormat,
        compress: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = Path::new(output_dir);
        std::fs::create_dir_all(dir)?;

        // Sub-second precision keeps back-to-back runs from sharing a file.
        let stamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| "unknown".to_string())
            .replace(':', "-");

        let (jsonl_writer, jsonl_path) = match format {
            OutputFormat::Jsonl => {
                let filename = format!("simulation_{stamp}.jsonl");
                if compress {
                    let gz_path = dir.join(format!("{filename}.gz"));
                    let writer: Box<dyn Write + Send> = Box::new(BufWriter::new(GzEncoder::new(
                        File::create(&gz_path)?,
                        Compression::default(),
                    )));
                    (Some(writer), Some(gz_path))
                } else {
                    let path = dir.join(&filename);
                    let writer: Box<dyn Write + Send> =
                        Box::new(BufWriter::new(create_truncated(&path)?));
                    (Some(writer), Some(path))
                }
            }
            OutputFormat::None => (None, None),
        };

        // Always write the CSV summary; the header comes from the first row.
        let csv_path = dir.join(format!("simulation_{stamp}_summary.csv"));
        let csv_writer = csv::Writer::from_writer(BufWriter::new(create_truncated(&csv_path)?));

        Ok(Self {
            jsonl_writer,
            csv_writer: Some(csv_writer),
            jsonl_path,
            csv_path: Some(csv_path),
        })
    }

    pub fn write_game(&mut self, metrics: &GameMetrics) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut writer) = self.jsonl_writer {
            let json = serde_json::to_string(metrics)?;
            writeln!(writer, "{json}")?;
        }

        if let Some(ref mut writer) = self.csv_writer {
            let row: CsvSummaryRow = metrics.into();
            writer.serialize(&row)?;
        }

        Ok(())
    }

    pub fn finish(mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut writer) = self.jsonl_writer {
            writer.flush()?;
        }
        if let Some(ref mut writer) = self.csv_writer {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn output_paths(&self) -> (Option<&PathBuf>, Option<&PathBuf>) {
        (self.jsonl_path.as_ref(), self.csv_path.as_ref())
    }
}
