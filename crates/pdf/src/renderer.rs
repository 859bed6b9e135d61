use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use typst::layout::PagedDocument;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_as_lib::TypstEngine;

use crate::markup::build_markup;
use crate::report::GroupReport;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Typst compilation failed: {0}")]
    Compile(String),
    #[error("PDF export failed: {0}")]
    Pdf(String),
}

/// Turns one group's report into document bytes.
pub trait Renderer: Send + Sync {
    fn render(&self, report: &GroupReport<'_>) -> Result<Vec<u8>, RenderError>;

    /// File extension of the produced documents, without the dot.
    fn extension(&self) -> &str {
        "pdf"
    }
}

// ── Typst backend ─────────────────────────────────────────────────────────────

const LEFT_LOGO: &str = "logo-left";
const RIGHT_LOGO: &str = "logo-right";

/// Compiles the statement markup in-process and exports it as PDF.
/// Logos are copied into a scratch directory that serves as the Typst root.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypstRenderer;

impl TypstRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn stage_logo(src: &Path, root: &Path, stem: &str) -> Result<String, std::io::Error> {
    let name = match src.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{}", ext.to_lowercase()),
        None => stem.to_string(),
    };
    std::fs::copy(src, root.join(&name))?;
    Ok(name)
}

impl Renderer for TypstRenderer {
    fn render(&self, report: &GroupReport<'_>) -> Result<Vec<u8>, RenderError> {
        let root = tempfile::TempDir::new()?;
        let logos = match report.branding.logos() {
            Some((left, right)) => Some((
                stage_logo(left, root.path(), LEFT_LOGO)?,
                stage_logo(right, root.path(), RIGHT_LOGO)?,
            )),
            None => None,
        };

        let source = build_markup(report, logos.as_ref().map(|(l, r)| (l.as_str(), r.as_str())));
        tracing::debug!(key = %report.summary.key, bytes = source.len(), "Compiling statement");

        let engine = TypstEngine::builder()
            .main_file(source)
            .search_fonts_with(TypstKitFontOptions::default())
            .with_file_system_resolver(root.path())
            .build();

        let doc: PagedDocument = engine
            .compile()
            .output
            .map_err(|e| RenderError::Compile(e.to_string()))?;

        typst_pdf::pdf(&doc, &typst_pdf::PdfOptions::default()).map_err(|diagnostics| {
            let messages: Vec<String> = diagnostics.iter().map(|d| d.message.to_string()).collect();
            RenderError::Pdf(messages.join("; "))
        })
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Emits the generated markup as the document body, optionally failing for
/// chosen group keys. Lets the run driver be tested without the Typst engine.
#[derive(Debug, Default, Clone)]
pub struct MockRenderer {
    failing: HashSet<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }
}

impl Renderer for MockRenderer {
    fn render(&self, report: &GroupReport<'_>) -> Result<Vec<u8>, RenderError> {
        if self.failing.contains(&report.summary.key) {
            return Err(RenderError::Compile(format!(
                "simulated failure for '{}'",
                report.summary.key
            )));
        }
        Ok(build_markup(report, None).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::*;
    use crate::report::Branding;
    use releve_core::{ReportVariant, VariantKind};

    #[test]
    fn mock_renders_markup_and_fails_on_request() {
        let variant = ReportVariant::preset(VariantKind::Centres);
        let (summary, rows, branding) = (summary(), rows(), Branding::default());
        let report = GroupReport {
            variant: &variant,
            summary: &summary,
            rows: &rows,
            branding: &branding,
            generated_at: at(30, 0, 0, 0),
        };

        let ok = MockRenderer::new().render(&report).unwrap();
        assert!(String::from_utf8(ok).unwrap().contains("#\"KSAR\""));

        let err = MockRenderer::new().failing_on("KSAR").render(&report).unwrap_err();
        assert!(matches!(err, RenderError::Compile(_)));
        assert_eq!(MockRenderer::new().extension(), "pdf");
    }

    #[test]
    fn stage_logo_keeps_extension() {
        let src_dir = tempfile::TempDir::new().unwrap();
        let root = tempfile::TempDir::new().unwrap();
        let src = src_dir.path().join("bpm.PNG");
        std::fs::write(&src, b"png").unwrap();
        let name = stage_logo(&src, root.path(), LEFT_LOGO).unwrap();
        assert_eq!(name, "logo-left.png");
        assert!(root.path().join(&name).is_file());
    }
}
