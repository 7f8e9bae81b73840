//! Domain model (tokens, values, request/response envelopes, errors).

pub mod errors;
pub mod request;
pub mod response;
pub mod tokens;
pub mod value;

pub use self::errors::{InvocationError, LookupReason, MethodError};
pub use self::request::RequestEnvelope;
pub use self::response::{FailureKind, RemoteFailure, ResponseEnvelope};
pub use self::tokens::{AccessToken, TransactionToken};
pub use self::value::{PluginObject, Value};
