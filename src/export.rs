use log::warn;

use crate::error::AppError;

pub const TEXT_FILENAME: &str = "video_summary.txt";
pub const TEXT_MIME: &str = "text/plain";
pub const DOCUMENT_FILENAME: &str = "video_summary.docx";
pub const DOCUMENT_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOCUMENT_HEADING: &str = "YouTube Video Summary";

const DOCUMENT_DISABLED_NOTICE: &str =
    "Word export is not available in this build. Only text download will be available.";

/// Which download formats this build can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportCapability {
    PlainTextOnly,
    PlainTextAndDocument,
}

impl ExportCapability {
    /// Resolve from the compiled-in features
    pub fn detect() -> Self {
        if cfg!(feature = "docx") {
            ExportCapability::PlainTextAndDocument
        } else {
            ExportCapability::PlainTextOnly
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PlainText,
    Document,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::PlainText => write!(f, "txt"),
            ArtifactKind::Document => write!(f, "docx"),
        }
    }
}

/// A downloadable rendering of a summary
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub fn plain_text(summary: &str) -> ExportArtifact {
    ExportArtifact {
        kind: ArtifactKind::PlainText,
        filename: TEXT_FILENAME,
        mime: TEXT_MIME,
        bytes: summary.as_bytes().to_vec(),
    }
}

pub struct Exporter {
    capability: ExportCapability,
    notified: bool,
    render_document: fn(&str) -> Result<ExportArtifact, AppError>,
}

impl Exporter {
    pub fn new(capability: ExportCapability) -> Self {
        Self {
            capability,
            notified: false,
            render_document,
        }
    }

    /// Formats currently on offer
    pub fn available(&self) -> &'static [ArtifactKind] {
        match self.capability {
            ExportCapability::PlainTextOnly => &[ArtifactKind::PlainText],
            ExportCapability::PlainTextAndDocument => &[ArtifactKind::PlainText, ArtifactKind::Document],
        }
    }

    /// The "Word export disabled" warning, once per exporter
    pub fn take_notice(&mut self) -> Option<&'static str> {
        if self.capability == ExportCapability::PlainTextOnly && !self.notified {
            self.notified = true;
            warn!("{DOCUMENT_DISABLED_NOTICE}");
            return Some(DOCUMENT_DISABLED_NOTICE);
        }
        None
    }

    pub fn export(&self, kind: ArtifactKind, summary: &str) -> Result<ExportArtifact, AppError> {
        match kind {
            ArtifactKind::PlainText => Ok(plain_text(summary)),
            ArtifactKind::Document => self.document(summary),
        }
    }

    pub fn document(&self, summary: &str) -> Result<ExportArtifact, AppError> {
        match self.capability {
            ExportCapability::PlainTextOnly => Err(AppError::ExportCapabilityMissing),
            ExportCapability::PlainTextAndDocument => (self.render_document)(summary),
        }
    }

    /// One result per available format; a failed format never takes the others down
    pub fn artifacts(&self, summary: &str) -> Vec<Result<ExportArtifact, AppError>> {
        self.available()
            .iter()
            .map(|kind| {
                self.export(*kind, summary).inspect_err(|e| warn!("Export of {kind} failed: {e}"))
            })
            .collect()
    }
}

#[cfg(feature = "docx")]
fn render_document(summary: &str) -> Result<ExportArtifact, AppError> {
    use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};

    let mut body = Run::new();
    for (i, line) in summary.lines().enumerate() {
        if i > 0 {
            body = body.add_break(BreakType::TextWrapping);
        }
        body = body.add_text(line);
    }

    let title_style = Style::new("Title", StyleType::Paragraph).name("Title").size(56);

    let mut buf = std::io::Cursor::new(Vec::new());
    Docx::new()
        .add_style(title_style)
        .add_paragraph(Paragraph::new().style("Title").add_run(Run::new().add_text(DOCUMENT_HEADING)))
        .add_paragraph(Paragraph::new().add_run(body))
        .build()
        .pack(&mut buf)
        .map_err(|e| AppError::ExportFailed {
            reason: format!("packing Word document: {e}"),
        })?;

    Ok(ExportArtifact {
        kind: ArtifactKind::Document,
        filename: DOCUMENT_FILENAME,
        mime: DOCUMENT_MIME,
        bytes: buf.into_inner(),
    })
}

#[cfg(not(feature = "docx"))]
fn render_document(_summary: &str) -> Result<ExportArtifact, AppError> {
    Err(AppError::ExportCapabilityMissing)
}
