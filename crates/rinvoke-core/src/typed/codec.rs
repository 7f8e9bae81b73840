//! PayloadCodec - 値とエンベロープのバイナリ変換
//!
//! # 使い方
//! - Binary 引数を `Value` に復元する（caller が PluginObject を事前シリアライズした想定）
//! - `Value::Object` の戻り値を Binary に変換する
//! - ResponseEnvelope 全体を 1 メッセージにエンコードする
//!
//! invocation task ごとに 1 つ作り、task 間で共有しません。

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::value::{DEFAULT_MAX_DEPTH, DepthScope};
use crate::domain::{ResponseEnvelope, Value};

/// Default upper bound for a single encoded message.
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("value nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// PayloadCodec は serde 型と bytes を相互変換
///
/// bincode の `DefaultOptions`（varint）に上限サイズを付けて使います。
/// decode 時は `Value` のネストの深さも制限します（bincode 自体は再帰を制限しない）。
#[derive(Debug, Clone, Copy)]
pub struct PayloadCodec {
    max_message_bytes: u64,
    max_depth: usize,
}

impl PayloadCodec {
    pub fn new(max_message_bytes: u64) -> Self {
        Self {
            max_message_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_message_bytes(&self) -> u64 {
        self.max_message_bytes
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new().with_limit(self.max_message_bytes)
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(self.options().serialize(value)?)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let scope = DepthScope::enter(self.max_depth);
        match self.options().deserialize(bytes) {
            Ok(value) => Ok(value),
            Err(_) if scope.exceeded() => Err(CodecError::TooDeep(self.max_depth)),
            Err(err) => Err(err.into()),
        }
    }

    pub fn decode_value(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        self.decode(bytes)
    }

    pub fn decode_response(&self, bytes: &[u8]) -> Result<ResponseEnvelope, CodecError> {
        self.decode(bytes)
    }
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessToken, PluginObject};

    #[test]
    fn object_survives_binary_trip() {
        let codec = PayloadCodec::default();
        let obj = Value::from(
            PluginObject::new("inventory.Item")
                .with_field("sku", "A-1")
                .with_field("tags", Value::List(vec![Value::from("new"), Value::Null])),
        );

        let bytes = codec.encode(&obj).unwrap();
        assert_eq!(codec.decode_value(&bytes).unwrap(), obj);
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = PayloadCodec::default();
        let err = codec.decode_value(&[0xff, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.to_string().starts_with("bincode:"));
    }

    fn nested_list(depth: usize) -> Value {
        let mut value = Value::Null;
        for _ in 0..depth {
            value = Value::List(vec![value]);
        }
        value
    }

    #[test]
    fn nesting_depth_is_bounded_on_decode() {
        let codec = PayloadCodec::default().with_max_depth(16);
        let bytes = codec.encode(&nested_list(40)).unwrap();

        let err = codec.decode_value(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::TooDeep(16)));

        // depth 16 = 15 lists + the innermost Null
        let ok = nested_list(15);
        let bytes = codec.encode(&ok).unwrap();
        assert_eq!(codec.decode_value(&bytes).unwrap(), ok);
    }

    #[test]
    fn hostile_nesting_does_not_overflow_the_stack() {
        // List(len 1) repeated, far deeper than any stack could recurse
        let mut bytes = [6_u8, 1].repeat(200_000);
        bytes.push(0);

        let err = PayloadCodec::default().decode_value(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::TooDeep(DEFAULT_MAX_DEPTH)));
    }

    #[test]
    fn limit_is_enforced_on_encode() {
        let codec = PayloadCodec::new(8);
        let value = Value::from("this string is longer than eight bytes");
        assert!(codec.encode(&value).is_err());
    }

    #[test]
    fn response_envelope_decodes() {
        let codec = PayloadCodec::default();
        let response = ResponseEnvelope::success(AccessToken::generate(), Value::Int(42));
        let bytes = codec.encode(&response).unwrap();
        assert_eq!(codec.decode_response(&bytes).unwrap(), response);
    }
}
