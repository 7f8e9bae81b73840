use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rinvoke_core::app::{InvocationConfig, RemoteInvocation, ServiceBuilder, VERSION_METHOD};
use rinvoke_core::domain::{
    AccessToken, MethodError, PluginObject, RequestEnvelope, TransactionToken, Value,
};
use rinvoke_core::impls::{MpscChannel, ResponseTable};
use rinvoke_core::ports::OutboundChannel;
use rinvoke_core::typed::{Method, PayloadCodec, ServiceRegistry, from_fn};

const DEFAULT_SCRIPT: &str = r#"{
  "calls": [
    { "method": "echo", "args": ["hi"] },
    { "method": "getServerVersion", "args": ["ignored"] },
    { "method": "boom" },
    { "method": "shutdown" },
    { "method": "whoami", "transaction": true, "environment": "staging" },
    { "method": "describe", "args": [{ "$object": "inventory.Item", "fields": { "sku": "A-1", "count": 3 } }] },
    { "method": "makeItem", "args": ["B-2"] }
  ]
}"#;

#[derive(Debug, Deserialize)]
struct Script {
    calls: Vec<ScriptedCall>,
}

#[derive(Debug, Deserialize)]
struct ScriptedCall {
    method: String,
    #[serde(default)]
    args: Vec<serde_json::Value>,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    transaction: bool,
}

/// JSON → Value
///
/// `{"$object": "...", "fields": {...}}` は PluginObject とみなし、
/// リモートの caller と同じように Binary に事前シリアライズする
fn to_value(json: serde_json::Value, codec: &PayloadCodec) -> Result<Value, Box<dyn Error>> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(|item| to_value(item, codec))
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::String(type_name)) = map.remove("$object") {
                let mut obj = PluginObject::new(type_name);
                if let Some(serde_json::Value::Object(fields)) = map.remove("fields") {
                    for (name, field) in fields {
                        obj = obj.with_field(name, to_value(field, codec)?);
                    }
                }
                Value::Binary(codec.encode(&Value::Object(obj))?)
            } else {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    out.insert(k, to_value(v, codec)?);
                }
                Value::Map(out)
            }
        }
    };
    Ok(value)
}

/// セッション情報を読むメソッド（session-context の注入が前提）
struct WhoAmI;

#[async_trait]
impl Method for WhoAmI {
    async fn call(&self, args: Vec<Value>) -> Result<Value, MethodError> {
        let [creds, txn, env] = args.as_slice() else {
            return Err(MethodError::arity(3, args.len()));
        };
        let mut out = BTreeMap::new();
        out.insert("creds".to_string(), creds.clone());
        out.insert("transaction".to_string(), txn.clone());
        out.insert("environment".to_string(), env.clone());
        Ok(Value::Map(out))
    }
}

fn demo_service(inject: bool) -> Result<ServiceRegistry, Box<dyn Error>> {
    // session-context が有効なら末尾 3 つを落として本来の引数だけ見る
    let declared = move |mut args: Vec<Value>| {
        if inject {
            let keep = args.len().saturating_sub(3);
            args.truncate(keep);
        }
        args
    };

    let service = ServiceBuilder::new()
        .expose(
            "echo",
            from_fn(move |args| {
                declared(args)
                    .into_iter()
                    .next()
                    .ok_or_else(|| MethodError::arity(1, 0))
            }),
        )?
        .expose(
            VERSION_METHOD,
            from_fn(|_| Ok(Value::from(env!("CARGO_PKG_VERSION")))),
        )?
        .expose("boom", from_fn(|_| Err(MethodError::new("boom() always fails"))))?
        .expose("whoami", WhoAmI)?
        .expose(
            "describe",
            from_fn(move |args| match declared(args).first() {
                Some(Value::Object(obj)) => Ok(Value::from(format!(
                    "{} with {} field(s)",
                    obj.type_name,
                    obj.fields.len()
                ))),
                Some(other) => Err(MethodError::new(format!("expected an object, got {other:?}"))),
                None => Err(MethodError::arity(1, 0)),
            }),
        )?
        .expose(
            "makeItem",
            from_fn(move |args| {
                let sku = declared(args)
                    .first()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .ok_or_else(|| MethodError::new("sku must be a string"))?;
                Ok(Value::from(PluginObject::new("inventory.Item").with_field("sku", sku)))
            }),
        )?
        .restrict("shutdown", from_fn(|_| Ok(Value::Null)))?
        .expect_methods(&["echo", VERSION_METHOD, "whoami"])
        .build()?;
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // rinvoke-cli [config.json] [script.json]
    let mut argv = std::env::args().skip(1);
    let config = match argv.next() {
        Some(path) => InvocationConfig::from_path(path)?,
        None => InvocationConfig {
            inject_session_context: true,
            ..InvocationConfig::default()
        },
    };
    let script: Script = match argv.next() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_str(DEFAULT_SCRIPT)?,
    };

    let codec = PayloadCodec::new(config.max_message_bytes);
    let service = Arc::new(demo_service(config.inject_session_context)?);
    let table = Arc::new(ResponseTable::new());
    let (channel, mut rx) = MpscChannel::bounded(64);
    let outgoing: Arc<dyn OutboundChannel> = Arc::new(channel);

    // (A) 1 リクエスト = 1 task で投げっぱなし
    let mut methods: HashMap<AccessToken, String> = HashMap::new();
    for call in script.calls {
        let args = call
            .args
            .into_iter()
            .map(|a| to_value(a, &codec))
            .collect::<Result<Vec<_>, _>>()?;
        let creds = AccessToken::generate();
        let environment = call.environment.unwrap_or_else(|| config.environment.clone());
        let mut request = RequestEnvelope::new(call.method.clone(), args, creds, environment);
        if call.transaction {
            request = request.with_transaction(TransactionToken::generate());
        }
        methods.insert(creds, call.method);

        let invocation = RemoteInvocation::from_config(
            request,
            outgoing.clone(),
            service.clone(),
            &config,
            table.clone(),
        );
        Arc::new(invocation).spawn();
    }
    drop(outgoing);

    // (B) channel の反対側: レスポンスを decode して相関テーブルに置く
    while let Some(message) = rx.recv().await {
        let response = codec.decode_response(&message)?;
        table.insert(*response.creds(), response).await;
    }

    // (C) caller 側: トークンごとに取り出す
    for (creds, method) in &methods {
        let Some(response) = table.take(creds).await else {
            warn!(%creds, method, "no response received");
            continue;
        };
        match response.into_outcome() {
            Ok(Value::Binary(bytes)) => {
                let value = codec.decode_value(&bytes)?;
                info!(%creds, method, result = ?value, "success (binary payload)");
            }
            Ok(value) => info!(%creds, method, result = ?value, "success"),
            Err(failure) => warn!(%creds, method, %failure, "failure"),
        }
    }

    Ok(())
}
