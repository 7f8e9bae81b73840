//! RequestEnvelope - a decoded remote method call.

use serde::{Deserialize, Serialize};

use super::tokens::{AccessToken, TransactionToken};
use super::value::Value;

/// RequestEnvelope は 1 回のリモート呼び出しに必要な全情報
///
/// 外部の dispatcher が構築し、invocation task が所有します。
/// 構築後は変更されません（フィールドは private、読み取りのみ）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    method: String,
    args: Vec<Value>,
    creds: AccessToken,
    #[serde(default)]
    transaction: Option<TransactionToken>,
    environment: String,
}

impl RequestEnvelope {
    pub fn new(
        method: impl Into<String>,
        args: Vec<Value>,
        creds: AccessToken,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            args,
            creds,
            transaction: None,
            environment: environment.into(),
        }
    }

    pub fn with_transaction(mut self, transaction: TransactionToken) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn creds(&self) -> &AccessToken {
        &self.creds
    }

    pub fn transaction(&self) -> Option<&TransactionToken> {
        self.transaction.as_ref()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}
