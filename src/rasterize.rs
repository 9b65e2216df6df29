//! PDF figure rasterization for web display.

use crate::error::Result;
use crate::media::find_files;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

/// Rendering resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// External tools able to render a PDF page to PNG, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterTool {
    /// `pdftoppm` from poppler-utils
    Pdftoppm,
    /// ImageMagick `convert`
    ImageMagick,
}

impl RasterTool {
    pub fn program(self) -> &'static str {
        match self {
            RasterTool::Pdftoppm => "pdftoppm",
            RasterTool::ImageMagick => "convert",
        }
    }

    /// Builds the command rendering `pdf` to `png`.
    pub fn command(self, pdf: &Path, png: &Path, dpi: u32) -> Command {
        let mut command = Command::new(self.program());
        let dpi = dpi.to_string();
        match self {
            RasterTool::Pdftoppm => {
                // pdftoppm appends the .png extension itself
                command
                    .args(["-png", "-singlefile", "-r", dpi.as_str()])
                    .arg(pdf)
                    .arg(png.with_extension(""));
            }
            RasterTool::ImageMagick => {
                command
                    .args(["-density", dpi.as_str()])
                    .arg(pdf)
                    .arg(png);
            }
        }
        command
    }
}

/// Rasterization counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterReport {
    pub converted: usize,
    pub skipped: usize,
    pub failed: Vec<String>,
}

/// Converts PDF files to PNG siblings.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    tools: Vec<RasterTool>,
    dpi: u32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            tools: vec![RasterTool::Pdftoppm, RasterTool::ImageMagick],
            dpi: DEFAULT_DPI,
        }
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(mut self, tools: Vec<RasterTool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    fn convert_one(&self, pdf: &Path, png: &Path) -> bool {
        for tool in &self.tools {
            match tool.command(pdf, png, self.dpi).output() {
                Ok(output) if output.status.success() => {
                    debug!(pdf = %pdf.display(), tool = tool.program(), "rasterized");
                    return true;
                }
                Ok(output) => {
                    debug!(
                        tool = tool.program(),
                        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                        "rasterizer failed"
                    );
                }
                Err(err) => debug!(tool = tool.program(), error = %err, "rasterizer unavailable"),
            }
        }
        false
    }

    /// Rasterizes every PDF below `dir` that has no PNG sibling yet.
    pub fn convert_dir(&self, dir: &Path) -> Result<RasterReport> {
        let mut report = RasterReport::default();
        if !dir.is_dir() {
            return Ok(report);
        }

        for pdf in find_files(dir, "pdf")? {
            let png = pdf.with_extension("png");
            if png.exists() {
                report.skipped += 1;
                continue;
            }
            if self.convert_one(&pdf, &png) {
                report.converted += 1;
            } else {
                warn!(pdf = %pdf.display(), "could not convert PDF to PNG");
                report.failed.push(pdf.display().to_string());
            }
        }

        info!(
            converted = report.converted,
            skipped = report.skipped,
            failed = report.failed.len(),
            "rasterized PDF figures"
        );
        Ok(report)
    }
}
