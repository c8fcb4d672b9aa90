use std::fs::File;
use std::io::Write;
use std::path::Path;

use hustle_bench_model::{Report, REPORT_HEADER};

use crate::error::ReportWriteError;

/// A sink for the final [Report].
pub trait WriteReport {
    type Error;

    /// Write every row of the report, header first.
    fn write_report(&mut self, report: &Report) -> Result<(), Self::Error>;
}

/// Writes the report as comma separated values.
///
/// Records are terminated with `\r\n` and fields are only quoted when they need to be.
pub struct CsvReportWriter<W>
where
    W: Write,
{
    writer: csv::Writer<W>,
}

impl<W> CsvReportWriter<W>
where
    W: Write,
{
    /// Creates a new [`CsvReportWriter`] with the specified [`Write`]r.
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W, ReportWriteError> {
        self.writer.into_inner().map_err(|e| {
            ReportWriteError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}

impl CsvReportWriter<File> {
    /// Creates a new [`CsvReportWriter`] writing to a file at the specified path.
    ///
    /// Missing parent directories are created and an existing file is truncated.
    pub fn from_file<P>(path: P) -> Result<Self, ReportWriteError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W> WriteReport for CsvReportWriter<W>
where
    W: Write,
{
    type Error = ReportWriteError;

    fn write_report(&mut self, report: &Report) -> Result<(), Self::Error> {
        self.writer.write_record(REPORT_HEADER)?;
        for row in report.rows() {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        log::debug!("Wrote {} report rows", report.len());
        Ok(())
    }
}

/// Write the report to a CSV file at `path`.
pub fn write_report_file(path: impl AsRef<Path>, report: &Report) -> Result<(), ReportWriteError> {
    CsvReportWriter::from_file(path)?.write_report(report)
}
