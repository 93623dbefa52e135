//! Error types and result definitions for ingest operations.
//!
//! Provides an error system with classification and captured diagnostic metadata for the
//! fetch and persist stages of the pipeline. The [`IngestError`] type supports single
//! errors, errors with additional detail, and multiple aggregated errors for the
//! orchestrator's join-all phase.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for ingest operations using [`IngestError`] as the error type.
pub type IngestResult<T> = Result<T, IngestError>;

/// Detailed payload stored for single [`IngestError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for ingest operations.
///
/// [`IngestError`] can represent a single classified error or multiple aggregated errors,
/// which is what the pipeline returns when several insert tasks fail independently.
#[derive(Debug, Clone)]
pub struct IngestError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors.
    ///
    /// This variant is mainly useful to capture multiple insert task failures.
    Many {
        errors: Vec<IngestError>,
        location: &'static Location<'static>,
    },
}

/// Specific categories of errors that can occur during ingest operations.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Source (remote people API) errors
    SourceRequestFailed,
    SourceResponseInvalid,

    // Destination (Postgres) errors
    DestinationConnectionFailed,
    DestinationQueryFailed,

    // Configuration errors
    ConfigError,

    // Task management errors
    InsertTaskPanic,

    // Unknown / uncategorized
    Unknown,
}

impl IngestError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple errors,
    /// returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified
    /// instance.
    ///
    /// Has no effect when called on aggregated errors because aggregates forward the first
    /// contained error as their source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }
        self
    }

    /// Creates an [`IngestError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let location = Location::caller();
        let backtrace = Arc::new(Backtrace::capture());

        IngestError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location,
                backtrace,
            }),
        }
    }
}

impl PartialEq for IngestError {
    fn eq(&self, other: &IngestError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (
                ErrorRepr::Many {
                    errors: errors_a, ..
                },
                ErrorRepr::Many {
                    errors: errors_b, ..
                },
            ) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                let location = payload.location;
                write!(
                    f,
                    "[{:?}] {} @ {}:{}:{}",
                    payload.kind,
                    payload.description,
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                write_detail(payload.detail.as_deref(), f, 1)?;
                write_backtrace(payload.backtrace.as_ref(), f, 1)?;

                Ok(())
            }
            ErrorRepr::Many { errors, location } => {
                let count = errors.len();
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}:{}",
                    count,
                    if count == 1 { "" } else { "s" },
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                if errors.is_empty() {
                    write!(f, "\n  (no inner errors provided)")?;
                } else {
                    for (index, error) in errors.iter().enumerate() {
                        let rendered = format!("{error}");
                        let mut lines = rendered.lines();
                        if let Some(first_line) = lines.next() {
                            write!(f, "\n  {}. {}", index + 1, first_line)?;
                        } else {
                            write!(f, "\n  {}.", index + 1)?;
                        }

                        for line in lines {
                            if line.is_empty() {
                                write!(f, "\n     ")?;
                            } else {
                                write!(f, "\n     {line}")?;
                            }
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for IngestError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| source as &(dyn error::Error + 'static)),
            // For aggregated errors, we forward the first contained error as the source.
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

/// Writes the captured backtrace with indentation.
fn write_backtrace(
    backtrace: &Backtrace,
    f: &mut fmt::Formatter<'_>,
    indent: usize,
) -> fmt::Result {
    let indent_str = "  ".repeat(indent);

    let rendered_backtrace = format!("{backtrace}");
    if !rendered_backtrace.trim().is_empty() {
        write!(f, "\n{indent_str}Backtrace:")?;
        for line in rendered_backtrace.lines() {
            if line.trim().is_empty() {
                write!(f, "\n{indent_str}  ")?;
            } else {
                write!(f, "\n{indent_str}  {line}")?;
            }
        }
    }

    Ok(())
}

/// Writes the detail block with indentation.
fn write_detail(detail: Option<&str>, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    if let Some(detail) = detail {
        let indent_str = "  ".repeat(indent);
        if detail.trim().is_empty() {
            write!(f, "\n{indent_str}Detail: <empty>")?;
        } else {
            write!(f, "\n{indent_str}Detail:")?;
            for line in detail.lines() {
                if line.is_empty() {
                    write!(f, "\n{indent_str}  ")?;
                } else {
                    write!(f, "\n{indent_str}  {line}")?;
                }
            }
        }
    }

    Ok(())
}

/// Creates an [`IngestError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for IngestError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> IngestError {
        IngestError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates an [`IngestError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for IngestError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> IngestError {
        IngestError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Creates an [`IngestError`] from a vector of errors for aggregation.
///
/// If the vector contains exactly one error, returns that error directly without wrapping
/// it in the aggregated variant.
impl<E> From<Vec<E>> for IngestError
where
    E: Into<IngestError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> IngestError {
        let location = Location::caller();

        let mut errors: Vec<IngestError> = errors.into_iter().map(Into::into).collect();

        if errors.len() == 1 {
            return errors.pop().expect("just checked length is 1");
        }

        IngestError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`reqwest::Error`] to [`IngestError`] with the appropriate error kind.
///
/// Body and decode failures map to [`ErrorKind::SourceResponseInvalid`]; everything else,
/// including timeouts and connection failures, maps to [`ErrorKind::SourceRequestFailed`].
impl From<reqwest::Error> for IngestError {
    #[track_caller]
    fn from(err: reqwest::Error) -> IngestError {
        let (kind, description) = if err.is_decode() || err.is_body() {
            (
                ErrorKind::SourceResponseInvalid,
                "People API response could not be decoded",
            )
        } else {
            (ErrorKind::SourceRequestFailed, "People API request failed")
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        IngestError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`sqlx::Error`] to [`IngestError`] with the appropriate error kind.
///
/// Transport and pool level failures map to [`ErrorKind::DestinationConnectionFailed`];
/// everything else, including constraint violations reported by the database, maps to
/// [`ErrorKind::DestinationQueryFailed`].
impl From<sqlx::Error> for IngestError {
    #[track_caller]
    fn from(err: sqlx::Error) -> IngestError {
        let (kind, description) = match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => (
                ErrorKind::DestinationConnectionFailed,
                "Postgres connection failed",
            ),
            _ => (ErrorKind::DestinationQueryFailed, "Postgres query failed"),
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        IngestError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`tokio::task::JoinError`] to [`IngestError`] with
/// [`ErrorKind::InsertTaskPanic`].
impl From<tokio::task::JoinError> for IngestError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> IngestError {
        let detail = err.to_string();
        let source = Arc::new(err);
        IngestError::from_components(
            ErrorKind::InsertTaskPanic,
            Cow::Borrowed("Insert task terminated abnormally"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest_error;

    #[test]
    fn single_error_exposes_kind_and_detail() {
        let err = ingest_error!(
            ErrorKind::SourceRequestFailed,
            "People API request failed",
            "connection refused"
        );

        assert_eq!(err.kind(), ErrorKind::SourceRequestFailed);
        assert_eq!(err.detail(), Some("connection refused"));
    }

    #[test]
    fn aggregation_of_one_error_unwraps_to_single() {
        let errors = vec![ingest_error!(ErrorKind::DestinationQueryFailed, "boom")];
        let aggregated = IngestError::from(errors);

        assert_eq!(aggregated.kind(), ErrorKind::DestinationQueryFailed);
        assert_eq!(aggregated.kinds().len(), 1);
    }

    #[test]
    fn aggregation_flattens_all_kinds() {
        let errors = vec![
            ingest_error!(ErrorKind::SourceRequestFailed, "fetch failed"),
            ingest_error!(ErrorKind::DestinationQueryFailed, "insert failed"),
        ];
        let aggregated = IngestError::from(errors);

        assert_eq!(
            aggregated.kinds(),
            vec![
                ErrorKind::SourceRequestFailed,
                ErrorKind::DestinationQueryFailed
            ]
        );
        // The first contained error decides the top-level kind.
        assert_eq!(aggregated.kind(), ErrorKind::SourceRequestFailed);
    }
}
