//! App - アプリケーション層
//!
//! ports と typed を組み合わせて 1 リクエストの実行を組み立てます。
//!
//! # 主要コンポーネント
//! - **ServiceBuilder**: サービスのメソッド表の構築（fail-fast）
//! - **InvocationConfig**: dispatcher 側の設定
//! - **RemoteInvocation**: 1 リクエスト = 1 task の実行単位

pub mod builder;
pub mod config;
pub mod invocation;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ServiceBuilder};
pub use self::config::{ConfigError, InvocationConfig};
pub use self::invocation::{
    DeliveryError, InvocationState, RemoteInvocation, SESSION_CONTEXT_ARGS, VERSION_METHOD,
};
