//! Routing errors and the run-level outcome contract.
//!
//! Only input problems and contract violations are errors. Infeasible moves
//! or insertions are never reported here: operators and construction steps
//! reject them locally.

use std::fmt;

/// Why a single location could not take part in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitError {
    /// The location could not be resolved onto the network.
    LocationUnresolved(String),
    /// The location resolved, but no route to or from it exists.
    NoRoute(String),
}

impl VisitError {
    /// Converts this per-location error into a [`RoutingError`] for `location`.
    pub fn to_routing_error(&self, location: usize) -> RoutingError {
        match self {
            VisitError::LocationUnresolved(message) => RoutingError::LocationUnresolved {
                location,
                message: message.clone(),
            },
            VisitError::NoRoute(message) => RoutingError::NoRoute {
                location,
                message: message.clone(),
            },
        }
    }
}

impl fmt::Display for VisitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitError::LocationUnresolved(m) => write!(f, "location unresolved: {m}"),
            VisitError::NoRoute(m) => write!(f, "no route: {m}"),
        }
    }
}

/// An error that fails an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// A location could not be resolved.
    LocationUnresolved {
        /// Original location index.
        location: usize,
        /// Resolver message.
        message: String,
    },
    /// No route exists to or from a location.
    NoRoute {
        /// Original location index.
        location: usize,
        /// Router message.
        message: String,
    },
    /// The fixed first location (or depot) is unusable.
    FirstUnavailable(Box<RoutingError>),
    /// The fixed last location is unusable.
    LastUnavailable(Box<RoutingError>),
    /// The weight-matrix provider failed as a whole.
    WeightMatrix(String),
    /// The problem definition is inconsistent (sizes, indices).
    InvalidProblem(String),
    /// The solver finished without producing a solution, for example
    /// because it was cancelled before its first result.
    NoSolution(String),
    /// A solver/problem combination that is not implemented.
    Unsupported(String),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::LocationUnresolved { location, message } => {
                write!(f, "could not resolve location {location}: {message}")
            }
            RoutingError::NoRoute { location, message } => {
                write!(f, "could not route to/from location {location}: {message}")
            }
            RoutingError::FirstUnavailable(inner) => {
                write!(f, "first location unavailable: {inner}")
            }
            RoutingError::LastUnavailable(inner) => {
                write!(f, "last location unavailable: {inner}")
            }
            RoutingError::WeightMatrix(m) => write!(f, "could not calculate weight matrix: {m}"),
            RoutingError::InvalidProblem(m) => write!(f, "invalid problem: {m}"),
            RoutingError::NoSolution(m) => write!(f, "no solution found: {m}"),
            RoutingError::Unsupported(m) => write!(f, "unsupported: {m}"),
        }
    }
}

impl std::error::Error for RoutingError {}

impl RoutingError {
    /// Returns `true` for contract violations rather than input problems.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RoutingError::Unsupported(_))
    }
}

/// Outcome of a complete run: either a value or a human-readable failure.
///
/// Callers check [`has_succeeded`](RunOutcome::has_succeeded) before
/// reading the value.
///
/// # Examples
///
/// ```
/// use u_tour::error::{RoutingError, RunOutcome};
///
/// let ok = RunOutcome::succeeded(3);
/// assert!(ok.has_succeeded());
/// assert_eq!(ok.value(), Some(&3));
///
/// let failed: RunOutcome<u32> =
///     RunOutcome::failed(RoutingError::WeightMatrix("timeout".into()));
/// assert!(!failed.has_succeeded());
/// assert!(failed.error_message().unwrap().contains("timeout"));
/// ```
#[derive(Debug, Clone)]
pub struct RunOutcome<T> {
    result: Result<T, RoutingError>,
}

impl<T> RunOutcome<T> {
    /// A successful outcome.
    pub fn succeeded(value: T) -> Self {
        Self { result: Ok(value) }
    }

    /// A failed outcome.
    pub fn failed(error: RoutingError) -> Self {
        Self { result: Err(error) }
    }

    /// Returns `true` if the run produced a value.
    pub fn has_succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure message, if the run failed.
    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(|e| e.to_string())
    }

    /// The failure, if the run failed.
    pub fn error(&self) -> Option<&RoutingError> {
        self.result.as_ref().err()
    }

    /// The produced value, if the run succeeded.
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Transforms the produced value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RunOutcome<U> {
        RunOutcome {
            result: self.result.map(f),
        }
    }

    /// Converts into a plain `Result`.
    pub fn into_result(self) -> Result<T, RoutingError> {
        self.result
    }
}

impl<T> From<Result<T, RoutingError>> for RunOutcome<T> {
    fn from(result: Result<T, RoutingError>) -> Self {
        Self { result }
    }
}
