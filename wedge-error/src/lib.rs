//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages, and the [`Error`] type that carries them.
//!
//! Errors in this workspace are always about some expression: a vector that is not in a span, an
//! equation that is not linear, a declaration that cannot hold. An [`Error`] therefore stores the
//! rendered text of that expression next to the kind of error, and the spans of the error point
//! into that text. [`Error::build_report`] turns the pair into an [`ariadne`] report.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::{any::Any, fmt::{self, Debug, Display}, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
///
/// This trait is usually derived with `wedge_attrs::ErrorKind`.
pub trait ErrorKind: Debug + Send + Sync + 'static {
    /// Returns `self` as [`Any`], so that the concrete kind can be recovered from a boxed kind.
    fn as_any(&self) -> &dyn Any;

    /// The message displayed at the top of the error.
    fn message(&self) -> String;

    /// The labels attached to each span of the error, in order.
    fn labels(&self) -> Vec<String> {
        Vec::new()
    }

    /// Optional help text describing what the user can do to fix the error.
    fn help(&self) -> Option<String> {
        None
    }

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)> {
        let offset = spans.first().map(|span| span.start).unwrap_or(0);
        let mut builder = Report::build(ReportKind::Error, src_id, offset)
            .with_message(self.message())
            .with_labels(
                spans.iter()
                    .zip(self.labels().into_iter().chain(std::iter::repeat(String::new())))
                    .map(|(span, label_str)| {
                        let mut label = Label::new((src_id, span.clone()))
                            .with_color(EXPR);

                        if !label_str.is_empty() {
                            label = label.with_message(label_str);
                        }

                        label
                    })
                    .collect::<Vec<_>>()
            );

        if let Some(help) = self.help() {
            builder.set_help(help);
        }
        builder.finish()
    }
}

/// An error associated with regions of the rendered expression it is about.
#[derive(Debug)]
pub struct Error {
    /// The rendered text of the expression (or list of expressions) this error is about.
    pub input: String,

    /// The regions of [`Error::input`] that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error about the given rendered input, highlighting all of it.
    pub fn new(input: impl Into<String>, kind: impl ErrorKind) -> Self {
        let input = input.into();
        let spans = if input.is_empty() { Vec::new() } else { vec![0..input.len()] };
        Self { input, spans, kind: Box::new(kind) }
    }

    /// Creates a new error with the given input, spans and kind.
    pub fn with_spans(
        input: impl Into<String>,
        spans: Vec<Range<usize>>,
        kind: impl ErrorKind,
    ) -> Self {
        Self { input: input.into(), spans, kind: Box::new(kind) }
    }

    /// Returns true if the kind of this error is `K`.
    pub fn is<K: ErrorKind>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Returns the kind of this error as a `K`, if it is one.
    pub fn downcast_ref<K: ErrorKind>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Renders the report of this error into a string, including ANSI color codes.
    pub fn render(&self, src_id: &str) -> String {
        let mut buf = Vec::new();
        // writing into a `Vec` cannot fail
        let _ = self.build_report(src_id)
            .write((src_id, Source::from(self.input.as_str())), &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.input.is_empty() {
            write!(f, "{}", self.kind.message())
        } else {
            write!(f, "{}: {}", self.kind.message(), self.input)
        }
    }
}

impl std::error::Error for Error {}
