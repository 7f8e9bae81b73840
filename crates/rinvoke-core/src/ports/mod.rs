//! Ports - 外部コラボレータとの境界
//!
//! invocation task が依存する外部の仕組みは、ここの trait 越しにだけ触ります。
//! 実装は `impls` に置きます。

pub mod channel;

pub use self::channel::{ChannelError, OutboundChannel};
