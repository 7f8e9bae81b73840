//! Errors - 呼び出し境界のエラー型と分類
//!
//! # 分類
//! - Lookup: メソッドが無い / 公開されていない / restricted
//! - Decode: Binary 引数を codec で復元できない
//! - Method / Panicked: 対象メソッドが失敗した（panic を含む）
//! - Encode: 戻り値を codec でシリアライズできない
//!
//! どれも invocation task の外には出ません。`RemoteFailure` に変換されて
//! レスポンスとして返ります。

use std::fmt;

use thiserror::Error;

use crate::typed::codec::CodecError;

/// Why the security gate refused a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupReason {
    NotFound,
    NotExposed,
    Restricted,
}

impl fmt::Display for LookupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupReason::NotFound => "not defined",
            LookupReason::NotExposed => "not exposed",
            LookupReason::Restricted => "restricted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("method '{method}' is {reason}")]
    Lookup { method: String, reason: LookupReason },

    #[error("failed to decode binary argument {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Method(#[from] MethodError),

    #[error("method panicked: {0}")]
    Panicked(String),

    #[error("failed to encode result: {0}")]
    Encode(#[source] CodecError),
}

impl InvocationError {
    pub fn lookup(method: impl Into<String>, reason: LookupReason) -> Self {
        InvocationError::Lookup {
            method: method.into(),
            reason,
        }
    }
}

/// MethodError は plugin メソッドが返すエラー
#[derive(Debug)]
pub struct MethodError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MethodError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn arity(expected: usize, got: usize) -> Self {
        Self::new(format!("expected {expected} argument(s), got {got}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for MethodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
