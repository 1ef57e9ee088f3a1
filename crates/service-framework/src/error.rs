//! # Service Errors
//!
//! This module defines the single error type shared by every service in the
//! framework, along with the combinator used to aggregate failures across a
//! group of services.
//!
//! [`ServiceError`] is `Clone` because a service records its stop result once
//! and replays it to every later `stop` and `wait` caller.

use std::error::Error;
use std::sync::Arc;

/// Boxed error returned by user supplied lifecycle callbacks.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Errors that can occur while driving a service through its lifecycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// `start` was called on a service that has already stopped.
    #[error("invalid start: service has already stopped")]
    InvalidStart,
    /// `stop` was called on a service that was never started.
    #[error("invalid stop: service was never started")]
    InvalidStop,
    /// `wait` was called on a service that is not running.
    #[error("invalid wait: service is not running")]
    InvalidWait,
    /// A user supplied `start` or `stop` callback failed.
    #[error(transparent)]
    Callback(Arc<dyn Error + Send + Sync + 'static>),
    /// Several failures collected while operating on a group of services.
    #[error("{}", join(.0))]
    Aggregate(Vec<ServiceError>),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

fn join(errors: &[ServiceError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    /// Wraps an error returned by a lifecycle callback.
    ///
    /// A callback that already returns a `ServiceError` (for example a nested
    /// service used as a callback) is passed through rather than wrapped.
    pub fn from_callback(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<ServiceError>() {
            Ok(err) => *err,
            Err(err) => ServiceError::Callback(Arc::from(err)),
        }
    }

    /// Returns the constituent errors.
    ///
    /// An `Aggregate` yields its members; any other error yields itself.
    pub fn errors(&self) -> &[ServiceError] {
        match self {
            ServiceError::Aggregate(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// Returns the callback error as `E`, if this is a callback failure of that type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            ServiceError::Callback(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Combines a sequence of results into one.
///
/// `Ok` is the identity. A single failure is returned unchanged, several
/// failures become one flattened [`ServiceError::Aggregate`] in input order.
pub fn combine<I>(results: I) -> Result<(), ServiceError>
where
    I: IntoIterator<Item = Result<(), ServiceError>>,
{
    let mut errors = Vec::new();
    for err in results.into_iter().filter_map(Result::err) {
        match err {
            ServiceError::Aggregate(inner) => errors.extend(inner),
            other => errors.push(other),
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ServiceError::Aggregate(errors)),
    }
}

/// Appends `right` to `left`; shorthand for combining exactly two results.
pub fn append(
    left: Result<(), ServiceError>,
    right: Result<(), ServiceError>,
) -> Result<(), ServiceError> {
    combine([left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_combine_ok_is_identity() {
        assert!(append(Ok(()), Ok(())).is_ok());
        assert!(combine(Vec::new()).is_ok());

        let err = append(Ok(()), Err(ServiceError::InvalidStop)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStop));

        let err = append(Err(ServiceError::InvalidWait), Ok(())).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidWait));
    }

    #[test]
    fn test_combine_keeps_every_error() {
        let err = combine([
            Err(ServiceError::InvalidStart),
            Ok(()),
            Err(ServiceError::from_callback(DiskFull)),
        ])
        .unwrap_err();

        let parts = err.errors();
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], ServiceError::InvalidStart));
        assert!(parts[1].downcast_ref::<DiskFull>().is_some());
        assert_eq!(
            err.to_string(),
            "invalid start: service has already stopped; disk full"
        );
    }

    #[test]
    fn test_combine_flattens_nested_aggregates() {
        let inner = append(
            Err(ServiceError::InvalidStop),
            Err(ServiceError::InvalidWait),
        );
        let err = append(inner, Err(ServiceError::InvalidStart)).unwrap_err();
        assert_eq!(err.errors().len(), 3);
    }

    #[test]
    fn test_from_callback_unwraps_service_errors() {
        let boxed: BoxError = Box::new(ServiceError::InvalidStop);
        assert!(matches!(
            ServiceError::from_callback(boxed),
            ServiceError::InvalidStop
        ));

        let err = ServiceError::from_callback("listener closed");
        assert!(matches!(err, ServiceError::Callback(_)));
        assert_eq!(err.to_string(), "listener closed");
        assert!(err.downcast_ref::<DiskFull>().is_none());
    }
}
