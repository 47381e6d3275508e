//! Concrete [`Renderer`] implementations.
//!
//! - [`PdfRenderer`]: built-in plain layout using `printpdf` builtin fonts.
//!   It ignores the style profile beyond passing it through.
//! - [`CommandRenderer`]: hands the merged Markdown to an external
//!   Markdown-to-PDF program on stdin.

use crate::contract::{BoxError, RenderJob, Renderer};
use crate::front_matter;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem,
};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const BODY_SIZE_PT: f32 = 11.0;
const HEADING_SIZE_PT: f32 = 14.0;
const LINE_HEIGHT_PT: f32 = 15.0;
const MAX_LINE_CHARS: usize = 90;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Heading(String),
    Text(String),
    Blank,
}

/// Lays the document out as plain text on A4 pages.
///
/// Front matter keys are printed as a `key: value` preamble, Markdown
/// headings in bold, everything else wrapped at a fixed column.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }

    fn layout(content: &str) -> Result<Vec<Line>, BoxError> {
        let (header, body) = front_matter::split(content)?;
        let mut lines = Vec::new();

        if !header.is_empty() {
            for (key, value) in &header {
                let rendered = match value.as_scalar_string() {
                    Some(scalar) => scalar,
                    None => value.to_string(),
                };
                wrap_into(&format!("{key}: {rendered}"), &mut lines);
            }
            lines.push(Line::Blank);
        }

        for raw in body.lines() {
            let trimmed = raw.trim_end();
            if trimmed.is_empty() {
                lines.push(Line::Blank);
            } else if trimmed.starts_with('#') {
                let heading = trimmed.trim_start_matches('#').trim();
                lines.push(Line::Heading(heading.to_string()));
            } else {
                wrap_into(trimmed, &mut lines);
            }
        }
        Ok(lines)
    }

    fn paginate(lines: &[Line]) -> Vec<PdfPage> {
        let top: Pt = Mm(PAGE_HEIGHT_MM - MARGIN_MM).into();
        let bottom: Pt = Mm(MARGIN_MM).into();
        let left: Pt = Mm(MARGIN_MM).into();

        let mut pages = Vec::new();
        let mut ops: Vec<Op> = Vec::new();
        let mut y = top.0;

        for line in lines {
            if y < bottom.0 {
                let full = std::mem::take(&mut ops);
                pages.push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), full));
                y = top.0;
            }
            let (text, font, size) = match line {
                Line::Heading(text) => (text, BuiltinFont::HelveticaBold, HEADING_SIZE_PT),
                Line::Text(text) => (text, BuiltinFont::Helvetica, BODY_SIZE_PT),
                Line::Blank => {
                    y -= LINE_HEIGHT_PT;
                    continue;
                }
            };
            ops.extend([
                Op::StartTextSection,
                Op::SetTextCursor {
                    pos: Point { x: left, y: Pt(y) },
                },
                Op::SetFontSizeBuiltinFont {
                    size: Pt(size),
                    font: font.clone(),
                },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(text.clone())],
                    font,
                },
                Op::EndTextSection,
            ]);
            y -= LINE_HEIGHT_PT;
        }
        pages.push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
        pages
    }
}

/// Greedy word wrap at [`MAX_LINE_CHARS`]. Words longer than a line are split.
fn wrap_into(text: &str, lines: &mut Vec<Line>) {
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > MAX_LINE_CHARS {
            if !current.is_empty() {
                lines.push(Line::Text(std::mem::take(&mut current)));
            }
            let head: String = word.chars().take(MAX_LINE_CHARS).collect();
            word = word.chars().skip(MAX_LINE_CHARS).collect();
            lines.push(Line::Text(head));
        }
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > MAX_LINE_CHARS && !current.is_empty() {
            lines.push(Line::Text(std::mem::take(&mut current)));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(Line::Text(current));
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), BoxError> {
        let lines = Self::layout(&job.content)?;
        let pages = Self::paginate(&lines);
        debug!(
            lines = lines.len(),
            pages = pages.len(),
            destination = %job.destination.display(),
            "Laid out document"
        );

        let title = job
            .destination
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut doc = PdfDocument::new(&title);
        let mut warnings = Vec::new();
        let bytes = doc
            .with_pages(pages)
            .save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "PDF serialisation produced warnings");
        }

        fs::write(&job.destination, &bytes).map_err(|e| {
            error!(error = ?e, path = %job.destination.display(), "Failed to write PDF");
            e
        })?;
        info!(size = bytes.len(), path = %job.destination.display(), "Wrote PDF");
        Ok(())
    }
}

/// Runs `program [args..] --style <style> --base <dir> --output <dest>` with
/// the merged Markdown on stdin.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the generated `--style/--base/--output` ones.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), BoxError> {
        info!(
            program = %self.program.display(),
            destination = %job.destination.display(),
            "Invoking external renderer"
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--style")
            .arg(&job.style_path)
            .arg("--base")
            .arg(&job.asset_base)
            .arg("--output")
            .arg(&job.destination)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to launch {}: {e}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(job.content.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, stderr = %stderr.trim(), "External renderer failed");
            return Err(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )
            .into());
        }
        Ok(())
    }
}
