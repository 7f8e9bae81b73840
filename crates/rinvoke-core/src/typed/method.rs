//! Method trait - リモートから呼ばれるメソッドの定義
//!
//! # 学習ポイント
//! - Object-safe な async trait（`Arc<dyn Method>` で保持できる）
//! - クロージャを trait object にするアダプタ（`FnMethod`）

use async_trait::async_trait;

use crate::domain::errors::MethodError;
use crate::domain::value::Value;

/// Method は位置引数のリストを受け取って Value を返す
///
/// # 使用例
/// ```ignore
/// struct Echo;
///
/// #[async_trait]
/// impl Method for Echo {
///     async fn call(&self, mut args: Vec<Value>) -> Result<Value, MethodError> {
///         if args.len() != 1 {
///             return Err(MethodError::arity(1, args.len()));
///         }
///         Ok(args.remove(0))
///     }
/// }
/// ```
///
/// session-context の注入が有効なサービスでは、末尾に
/// (AccessToken, TransactionToken または Null, environment) の 3 つが付きます。
#[async_trait]
pub trait Method: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<Value, MethodError>;
}

/// 同期クロージャを Method として使うためのラッパー
pub struct FnMethod<F> {
    f: F,
}

impl<F> FnMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value, MethodError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Method for FnMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value, MethodError> + Send + Sync,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, MethodError> {
        (self.f)(args)
    }
}

pub fn from_fn<F>(f: F) -> FnMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value, MethodError> + Send + Sync,
{
    FnMethod::new(f)
}
