//! Human-readable text report.
//!
//! ```text
//! 1: <Size: 1000 Bytes, BLAKE3: 5c1b..., Duplication: 2>
//!   /data/a.bin
//!   /data/b.bin
//!
//! 3 files scanned (2.9 KiB), 1 duplicate group, 1000 B reclaimable
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Line printed when a scan confirms no duplicates.
pub const NO_DUPLICATES: &str = "No duplication found!";

/// Text report formatter.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a text formatter. Colour is off until [`TextOutput::with_color`].
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI styling.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the report: numbered groups, then the summary footer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "{}", self.style_notice(NO_DUPLICATES))?;
        }

        for (idx, group) in self.groups.iter().enumerate() {
            let number = format!("{}:", idx + 1);
            write!(writer, "{} {}", self.style_number(&number), group)?;
            writeln!(writer)?;
        }

        self.write_errors(writer)?;
        writeln!(writer, "{}", self.summary_line())
    }

    fn write_errors<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.summary.scan_errors.is_empty() {
            return Ok(());
        }

        writeln!(
            writer,
            "{}",
            self.style_warning(&format!(
                "Skipped {} unreadable path(s):",
                self.summary.scan_errors.len()
            ))
        )?;
        for error in &self.summary.scan_errors {
            writeln!(writer, "  {error}")?;
        }
        writeln!(writer)
    }

    /// One-line scan summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let s = self.summary;
        let groups = if s.duplicate_groups == 1 {
            "group"
        } else {
            "groups"
        };
        format!(
            "{} files scanned ({}), {} duplicate {}, {} redundant, {} reclaimable ({:.1}%), {} read in {:.2?}",
            s.total_files,
            s.total_size_display(),
            s.duplicate_groups,
            groups,
            s.duplicate_files,
            s.reclaimable_display(),
            s.wasted_percentage(),
            ByteSize(s.bytes_read),
            s.scan_duration
        )
    }

    fn style_number(&self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn style_notice(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn style_warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }
}
