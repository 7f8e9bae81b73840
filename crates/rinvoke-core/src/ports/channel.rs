//! OutboundChannel port - レスポンスを caller に届けるバイト列の出口
//!
//! 実体は transport 側（共有メモリ、ソケットなど）にあり、このクレートは
//! `write` を 1 タスクにつき 1 回呼ぶだけです。読み出しはしません。

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("outbound channel is closed")]
    Closed,
}

/// OutboundChannel は append-only のメッセージ sink
///
/// # 並行性
/// 複数の invocation task が同時に `write` します。
/// 実装側がスレッドセーフであることが前提です（task はロックを取りません）。
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    async fn write(&self, message: Vec<u8>) -> Result<(), ChannelError>;
}
