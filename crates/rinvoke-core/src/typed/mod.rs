//! Typed - サービスのメソッド表と値の変換
//!
//! # 構成
//! - **method**: `Method` trait（object-safe）と `FnMethod` アダプタ
//! - **registry**: `ServiceRegistry`（名前 → メソッド + 公開範囲）
//! - **codec**: `PayloadCodec`（Value / envelope ⇔ bytes）

pub mod codec;
pub mod method;
pub mod registry;

// 主要な trait/型 を再エクスポート
pub use self::codec::{CodecError, PayloadCodec};
pub use self::method::{FnMethod, Method, from_fn};
pub use self::registry::{Access, RegistryError, ServiceRegistry};
