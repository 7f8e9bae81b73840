//! Response model: what a remote caller receives for one request.
//!
//! The outcome is a plain `Result`, so a response carries exactly one of a
//! success value or a failure description.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::InvocationError;
use super::tokens::AccessToken;
use super::value::Value;

/// Classification of a failed invocation.
///
/// Serialized as SCREAMING_SNAKE_CASE so the caller side can match on a
/// stable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    Lookup,
    Decode,
    Invocation,
    Encode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Lookup => "LOOKUP",
            FailureKind::Decode => "DECODE",
            FailureKind::Invocation => "INVOCATION",
            FailureKind::Encode => "ENCODE",
        };
        f.write_str(s)
    }
}

/// A failure description that survives the trip back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<InvocationError> for RemoteFailure {
    fn from(err: InvocationError) -> Self {
        let kind = match &err {
            InvocationError::Lookup { .. } => FailureKind::Lookup,
            InvocationError::Decode { .. } => FailureKind::Decode,
            InvocationError::Method(_) | InvocationError::Panicked(_) => FailureKind::Invocation,
            InvocationError::Encode(_) => FailureKind::Encode,
        };
        RemoteFailure::new(kind, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    creds: AccessToken,
    outcome: Result<Value, RemoteFailure>,
}

impl ResponseEnvelope {
    pub fn new(creds: AccessToken, outcome: Result<Value, RemoteFailure>) -> Self {
        Self { creds, outcome }
    }

    pub fn success(creds: AccessToken, value: Value) -> Self {
        Self::new(creds, Ok(value))
    }

    pub fn failure(creds: AccessToken, failure: RemoteFailure) -> Self {
        Self::new(creds, Err(failure))
    }

    pub fn creds(&self) -> &AccessToken {
        &self.creds
    }

    pub fn outcome(&self) -> Result<&Value, &RemoteFailure> {
        self.outcome.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> Result<Value, RemoteFailure> {
        self.outcome
    }
}
