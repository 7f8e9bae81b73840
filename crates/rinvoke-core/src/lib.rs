//! rinvoke-core
//!
//! Request-execution unit of a plugin remote-invocation protocol.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（tokens, value, request, response, errors）
//! - **ports**: 外部との境界（OutboundChannel）
//! - **typed**: メソッド表と codec（Method, ServiceRegistry, PayloadCodec）
//! - **impls**: 開発・テスト用の実装（MemoryChannel, MpscChannel, ResponseTable）
//! - **app**: 組み立て（ServiceBuilder, InvocationConfig, RemoteInvocation）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;
