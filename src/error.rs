pub use anyhow::Result;

use ariadne::{Cache, Config, Label, Report, ReportKind, Source};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Add;

/// A source position: 1-origin line, 0-origin column, counted in characters
/// as seen by the scanner (a tab advances the column by four).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Pos { line, column }
    }

    /// The position of the first character of a source.
    pub fn first() -> Self {
        Pos { line: 1, column: 0 }
    }
}

/// A half-open source range; `end` sits just past the last consumed character.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Self {
        Span { start, end }
    }
}

impl Add<Span> for Span {
    type Output = Span;

    fn add(self, rhs: Span) -> Span {
        Span {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

/// Merge two optional spans, treating `None` as "no opinion".
pub fn merge_spans(a: Option<Span>, b: Option<Span>) -> Option<Span> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Debug for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "span-{:?}-{:?}", self.start, self.end)
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    pub span: Option<Span>,
    pub reason: Reason,
    pub help: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Reason {
    Simple(String),
    Expected {
        who: Option<String>,
        expected: String,
        found: String,
    },
    Unexpected {
        found: String,
    },
    Unsupported {
        what: String,
    },
}

impl Error {
    pub fn new(reason: Reason) -> Self {
        Error {
            span: None,
            reason,
            help: None,
        }
    }

    pub fn simple<S: Into<String>>(message: S) -> Self {
        Error::new(Reason::Simple(message.into()))
    }

    pub fn with_help<S: Into<String>>(mut self, help: S) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

// Needed for anyhow
impl StdError for Error {}

// Needed for StdError
impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason.message())
    }
}

impl Reason {
    pub fn message(&self) -> String {
        match self {
            Reason::Simple(text) => text.clone(),
            Reason::Expected {
                who,
                expected,
                found,
            } => {
                let who = who.clone().map(|x| format!("{x} ")).unwrap_or_default();
                format!("{who}expected {expected}, but found {found}")
            }
            Reason::Unexpected { found } => format!("unexpected {found}"),
            Reason::Unsupported { what } => format!("{what} is not supported"),
        }
    }
}

/// Plain-data form of an [Error], suitable for callers and bindings.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    /// Plain text of the error
    pub reason: String,
    /// A list of suggestions of how to fix the error
    pub hint: Option<String>,
    /// Line/column range of the error origin within the source
    pub span: Option<Span>,

    /// Annotated code, containing cause and hints.
    pub display: Option<String>,
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // https://github.com/zesterer/ariadne/issues/52
        if let Some(display) = &self.display {
            let message_without_trailing_spaces = display
                .split('\n')
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
            f.write_str(&message_without_trailing_spaces)?;
        } else {
            f.write_str(&self.reason)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessages {
    pub inner: Vec<ErrorMessage>,
}

impl From<ErrorMessage> for ErrorMessages {
    fn from(e: ErrorMessage) -> Self {
        ErrorMessages { inner: vec![e] }
    }
}

impl Display for ErrorMessages {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for e in &self.inner {
            Display::fmt(&e, f)?;
        }
        Ok(())
    }
}

impl StdError for ErrorMessages {}

pub fn downcast(error: anyhow::Error) -> ErrorMessages {
    let mut span = None;
    let mut hint = None;

    let error = match error.downcast::<ErrorMessages>() {
        Ok(messages) => return messages,
        Err(error) => error,
    };

    // Contextual prefixes first, innermost reason last.
    let chain = error
        .chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>();

    let reason = match error.downcast::<Error>() {
        Ok(error) => {
            span = error.span;
            hint = error.help;

            if chain.len() > 1 {
                chain.join(": ")
            } else {
                error.reason.message()
            }
        }
        // default to basic Display
        Err(error) => format!("{:#}", error),
    };

    ErrorMessage {
        reason,
        hint,
        span,
        display: None,
    }
    .into()
}

impl ErrorMessages {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// Builds the pretty annotated display for each message.
    pub fn composed(mut self, source_id: &str, source: &str, color: bool) -> Self {
        let source = Source::from(source);
        for e in &mut self.inner {
            let cache = (source_id, source.clone());
            e.display = e.compose_display(source_id, &source, cache, color);
        }
        self
    }
}

impl ErrorMessage {
    fn compose_display<'a, C>(
        &self,
        source_id: &'a str,
        source: &Source,
        cache: C,
        color: bool,
    ) -> Option<String>
    where
        C: Cache<&'a str>,
    {
        let config = Config::default().with_color(color);

        let span = self.char_range(source)?;

        let mut report = Report::build(ReportKind::Error, source_id, span.start)
            .with_config(config)
            .with_message("")
            .with_label(Label::new((source_id, span)).with_message(&self.reason));

        if let Some(hint) = &self.hint {
            report.set_help(hint);
        }

        let mut out = Vec::new();
        report.finish().write(cache, &mut out).ok()?;
        String::from_utf8(out).ok()
    }

    /// Line/column positions to character offsets, the inverse of what
    /// ariadne computes internally.
    fn char_range(&self, source: &Source) -> Option<std::ops::Range<usize>> {
        let span = self.span?;
        let offset_of = |pos: Pos| -> Option<usize> {
            let line = source.line(pos.line.checked_sub(1)?)?;
            Some(line.offset() + pos.column)
        };
        Some(offset_of(span.start)?..offset_of(span.end)?)
    }
}

pub trait WithErrorInfo {
    fn with_help<S: Into<String>>(self, help: S) -> Self;

    fn with_span(self, span: Option<Span>) -> Self;
}

impl<T> WithErrorInfo for Result<T, Error> {
    fn with_help<S: Into<String>>(self, help: S) -> Self {
        self.map_err(|e| e.with_help(help))
    }

    fn with_span(self, span: Option<Span>) -> Self {
        self.map_err(|e| e.with_span(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(l1: usize, c1: usize, l2: usize, c2: usize) -> Span {
        Span::new(Pos::new(l1, c1), Pos::new(l2, c2))
    }

    #[test]
    fn test_span_merge() {
        let a = span(1, 4, 1, 9);
        let b = span(2, 0, 3, 2);
        assert_eq!(a + b, span(1, 4, 3, 2));
        assert_eq!(b + a, span(1, 4, 3, 2));
        assert_eq!(merge_spans(Some(a), None), Some(a));
        assert_eq!(merge_spans(None, Some(b)), Some(b));
    }

    #[test]
    fn test_span_order_is_source_order() {
        assert!(span(1, 7, 1, 9) < span(2, 0, 2, 1));
        assert!(span(3, 0, 3, 4) > span(3, 0, 3, 2));
    }

    #[test]
    fn test_downcast_keeps_span_and_context() {
        use anyhow::Context;

        let err: anyhow::Error = Error::new(Reason::Expected {
            who: None,
            expected: "a column name".to_string(),
            found: "','".to_string(),
        })
        .with_span(Some(span(1, 8, 1, 9)))
        .into();
        let err = Err::<(), _>(err)
            .context("parsing column definitions")
            .unwrap_err();

        let messages = downcast(err);
        let message = &messages.inner[0];
        assert_eq!(message.span, Some(span(1, 8, 1, 9)));
        assert!(message.reason.starts_with("parsing column definitions: "));
    }
}
