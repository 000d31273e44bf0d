use crate::canvas::Document;
use crate::error::{ReportError, Result};
use crate::font::FontRegistry;
use crate::pdf::{self, PdfOptions};
use chrono::{DateTime, FixedOffset};
use sha2::{Digest, Sha256};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
    pub created_at: DateTime<FixedOffset>,
}

pub struct RenderedReport<'a> {
    pub document: &'a Document,
    pub info: &'a DocumentInfo,
    pub(crate) fonts: &'a FontRegistry,
}

impl RenderedReport<'_> {
    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub bytes_written: usize,
    pub sha256: Option<String>,
}

// The engine calls write_document once with the complete document, then
// finish exactly once.
pub trait DocumentSink {
    fn write_document(&mut self, report: &RenderedReport<'_>) -> Result<()>;
    fn finish(&mut self) -> Result<SinkReport>;
}

impl<S: DocumentSink + ?Sized> DocumentSink for &mut S {
    fn write_document(&mut self, report: &RenderedReport<'_>) -> Result<()> {
        (**self).write_document(report)
    }

    fn finish(&mut self) -> Result<SinkReport> {
        (**self).finish()
    }
}

struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
    bytes: usize,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Open,
    Written,
    Finished,
}

pub struct PdfSink<W: Write> {
    writer: HashingWriter<W>,
    state: SinkState,
}

impl<W: Write> PdfSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: HashingWriter {
                inner: writer,
                hasher: Sha256::new(),
                bytes: 0,
            },
            state: SinkState::Open,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == SinkState::Finished
    }

    pub fn into_inner(self) -> W {
        self.writer.inner
    }
}

impl<W: Write> DocumentSink for PdfSink<W> {
    fn write_document(&mut self, report: &RenderedReport<'_>) -> Result<()> {
        if self.state != SinkState::Open {
            return Err(ReportError::SinkFinished);
        }
        let options = PdfOptions {
            document_title: report.info.title.clone(),
            producer: Some(report.info.producer.clone()),
            creation_date: Some(report.info.created_at),
        };
        pdf::write_document(report.document, report.fonts, options, &mut self.writer)?;
        self.state = SinkState::Written;
        Ok(())
    }

    fn finish(&mut self) -> Result<SinkReport> {
        if self.state == SinkState::Finished {
            return Err(ReportError::SinkFinished);
        }
        self.writer.flush()?;
        self.state = SinkState::Finished;
        let digest = std::mem::take(&mut self.writer.hasher).finalize();
        Ok(SinkReport {
            bytes_written: self.writer.bytes,
            sha256: Some(hex_digest(&digest)),
        })
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
