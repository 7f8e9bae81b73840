//! RemoteInvocation - 1 リクエストを実行して 1 レスポンスを書く task
//!
//! # フロー
//! 1. security gate（ServiceRegistry::resolve）
//! 2. 引数の組み立て（Binary の decode + session-context の注入）
//! 3. メソッド呼び出し（エラーも panic もここで捕まえる）
//! 4. ResponseEnvelope を encode して channel に 1 回だけ write
//!
//! 状態: `Created → Dispatching → {Succeeded | Failed} → Written → Terminated`
//! リトライ・タイムアウトはありません。
//!
//! 相関テーブル（ResponseTable）は受け取るだけで書き込みません。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::{
    AccessToken, InvocationError, RemoteFailure, RequestEnvelope, ResponseEnvelope,
    TransactionToken, Value,
};
use crate::impls::ResponseTable;
use crate::ports::{ChannelError, OutboundChannel};
use crate::typed::{CodecError, PayloadCodec, ServiceRegistry};

use super::config::InvocationConfig;

/// The version query takes no arguments at all, not even session context.
pub const VERSION_METHOD: &str = "getServerVersion";

/// Number of trailing arguments added by session-context injection.
pub const SESSION_CONTEXT_ARGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Created,
    Dispatching,
    Succeeded,
    Failed,
    Written,
    Terminated,
}

/// The response could not be handed to the channel.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to encode response envelope: {0}")]
    Encode(#[source] CodecError),

    #[error(transparent)]
    Write(#[from] ChannelError),
}

pub struct RemoteInvocation {
    request: RequestEnvelope,
    outgoing: Arc<dyn OutboundChannel>,
    service: Arc<ServiceRegistry>,
    inject_session_context: bool,
    responses: Arc<ResponseTable>,
    max_message_bytes: u64,
    max_depth: usize,
}

impl RemoteInvocation {
    pub fn new(
        request: RequestEnvelope,
        outgoing: Arc<dyn OutboundChannel>,
        service: Arc<ServiceRegistry>,
        inject_session_context: bool,
        responses: Arc<ResponseTable>,
    ) -> Self {
        let invocation = Self {
            request,
            outgoing,
            service,
            inject_session_context,
            responses,
            max_message_bytes: InvocationConfig::default().max_message_bytes,
            max_depth: InvocationConfig::default().max_nesting_depth,
        };
        debug!(
            state = ?InvocationState::Created,
            method = invocation.request.method(),
            "invocation created"
        );
        invocation
    }

    pub fn from_config(
        request: RequestEnvelope,
        outgoing: Arc<dyn OutboundChannel>,
        service: Arc<ServiceRegistry>,
        config: &InvocationConfig,
        responses: Arc<ResponseTable>,
    ) -> Self {
        Self::new(
            request,
            outgoing,
            service,
            config.inject_session_context,
            responses,
        )
        .with_max_message_bytes(config.max_message_bytes)
        .with_max_depth(config.max_nesting_depth)
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: u64) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The session that owns this invocation.
    pub fn access_token(&self) -> &AccessToken {
        self.request.creds()
    }

    /// The open transaction of the owning session, if any.
    pub fn transaction_token(&self) -> Option<&TransactionToken> {
        self.request.transaction()
    }

    /// The most recent environment of the owning session.
    pub fn environment(&self) -> &str {
        self.request.environment()
    }

    /// Channel the response is written to.
    pub fn outgoing(&self) -> &Arc<dyn OutboundChannel> {
        &self.outgoing
    }

    /// Correlation table handed in by the dispatcher. Never written here.
    pub fn responses(&self) -> &Arc<ResponseTable> {
        &self.responses
    }

    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// Detach the invocation onto the tokio runtime.
    ///
    /// Completion is only observable through the channel. A response that
    /// cannot be delivered is logged and dropped.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.run().await {
                error!(
                    method = self.request.method(),
                    creds = %self.request.creds(),
                    error = %err,
                    "response was not delivered"
                );
            }
            debug!(state = ?InvocationState::Terminated, "invocation finished");
        })
    }

    /// Execute the request and write exactly one response.
    ///
    /// Every failure up to and including the method call ends up in the
    /// response. Only a response that cannot be encoded or written at all is
    /// returned as an error.
    #[tracing::instrument(
        name = "remote_invocation",
        skip_all,
        fields(method = %self.request.method(), creds = %self.request.creds())
    )]
    pub async fn run(&self) -> Result<(), DeliveryError> {
        let codec = PayloadCodec::new(self.max_message_bytes).with_max_depth(self.max_depth);
        let creds = *self.request.creds();

        debug!(state = ?InvocationState::Dispatching, "dispatching");
        let outcome = match self.dispatch(&codec).await {
            Ok(value) => {
                debug!(state = ?InvocationState::Succeeded, "method returned");
                Ok(value)
            }
            Err(err) => {
                warn!(state = ?InvocationState::Failed, error = %err, "invocation failed");
                Err(RemoteFailure::from(err))
            }
        };

        let message = match codec.encode(&ResponseEnvelope::new(creds, outcome)) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "response envelope not encodable, sending encode failure");
                let failure = RemoteFailure::from(InvocationError::Encode(err));
                codec
                    .encode(&ResponseEnvelope::failure(creds, failure))
                    .map_err(DeliveryError::Encode)?
            }
        };

        self.outgoing.write(message).await?;
        debug!(state = ?InvocationState::Written, "response written");
        Ok(())
    }

    async fn dispatch(&self, codec: &PayloadCodec) -> Result<Value, InvocationError> {
        let method = self.service.resolve(self.request.method())?;
        let args = self.materialize_args(codec)?;

        // `call` itself may panic before it hands back a future
        let value = AssertUnwindSafe(async move { method.call(args).await })
            .catch_unwind()
            .await
            .map_err(|panic| InvocationError::Panicked(panic_message(panic.as_ref())))??;

        match value {
            // structured values never go on the wire as-is
            Value::Object(obj) => {
                let bytes = codec
                    .encode(&Value::Object(obj))
                    .map_err(InvocationError::Encode)?;
                Ok(Value::Binary(bytes))
            }
            other => Ok(other),
        }
    }

    fn materialize_args(&self, codec: &PayloadCodec) -> Result<Vec<Value>, InvocationError> {
        if self.request.method() == VERSION_METHOD {
            return Ok(Vec::new());
        }

        let extra = if self.inject_session_context {
            SESSION_CONTEXT_ARGS
        } else {
            0
        };
        let mut args = Vec::with_capacity(self.request.args().len() + extra);

        for (index, arg) in self.request.args().iter().enumerate() {
            let arg = match arg {
                // caller pre-serialized a plugin object
                Value::Binary(bytes) => codec
                    .decode_value(bytes)
                    .map_err(|source| InvocationError::Decode { index, source })?,
                other => other.clone(),
            };
            args.push(arg);
        }

        if self.inject_session_context {
            args.push(Value::AccessToken(*self.request.creds()));
            args.push(
                self.request
                    .transaction()
                    .map_or(Value::Null, |txn| Value::TransactionToken(*txn)),
            );
            args.push(Value::String(self.request.environment().to_string()));
        }

        Ok(args)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
