use std::fmt;
use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing in the document could be used.
    Error,
    /// Part of the document was skipped.
    Warning,
}

/// A parser message tied to a byte range of the lore document.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Byte range in the document.
    pub span: Range<usize>,
    /// Headline message.
    pub message: String,
    /// Text attached to the highlighted span, if different from the message.
    pub label: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// A warning diagnostic.
    pub fn warning(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// A skipped section: the parse went on without it.
    pub fn incomplete(span: Range<usize>, what: impl fmt::Display, why: impl Into<String>) -> Self {
        Self::warning(span, format!("incomplete {what}, skipped")).with_label(why)
    }

    /// Attach a label to the highlighted span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this is a warning.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)?;
        if let Some(label) = &self.label {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}

/// Render diagnostics with ariadne for terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let span = clamp(diag.span.clone(), source.len());
        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        let report = Report::build(kind, (filename, span.clone()))
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label_text)
                    .with_color(color),
            );

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

fn clamp(span: Range<usize>, len: usize) -> Range<usize> {
    span.start.min(len)..span.end.min(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::incomplete(0..5, "option 1A", "no Outcome: line");
        assert_eq!(
            d.to_string(),
            "warning: incomplete option 1A, skipped (no Outcome: line)"
        );
        assert!(d.is_warning());
    }

    #[test]
    fn render_produces_output() {
        let source = "Scene 1: The Spark\n• Option 1A: Strike";
        let diags = vec![Diagnostic::warning(19..38, "option without outcome").with_label("here")];
        let output = render_diagnostics(source, "lore.txt", &diags);
        assert!(output.contains("option without outcome"));
    }

    #[test]
    fn render_survives_out_of_range_spans() {
        let diags = vec![Diagnostic::error(50..90, "cannot read lore file")];
        let output = render_diagnostics("short", "lore.txt", &diags);
        assert!(output.contains("cannot read lore file"));
    }
}
