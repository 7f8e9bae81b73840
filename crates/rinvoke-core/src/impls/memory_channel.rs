//! MemoryChannel - 書き込まれたメッセージをそのまま保持する channel
//!
//! テストと開発用。`closed()` で作ると全ての write を拒否します
//! （write 失敗時の挙動を確かめるため）。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{ChannelError, OutboundChannel};

#[derive(Default)]
pub struct MemoryChannel {
    messages: Mutex<Vec<Vec<u8>>>,
    closed: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            closed: true,
        }
    }

    /// これまでに書き込まれたメッセージのコピー
    pub async fn messages(&self) -> Vec<Vec<u8>> {
        self.messages.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl OutboundChannel for MemoryChannel {
    async fn write(&self, message: Vec<u8>) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.messages.lock().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn records_writes_in_order() {
        let channel = MemoryChannel::new();
        channel.write(vec![1]).await.unwrap();
        channel.write(vec![2, 3]).await.unwrap();
        assert_eq!(channel.messages().await, vec![vec![1], vec![2, 3]]);
    }

    #[tokio::test]
    async fn closed_channel_rejects_writes() {
        let channel = MemoryChannel::closed();
        let err = channel.write(vec![1]).await.unwrap_err();
        assert!(matches!(err, ChannelError::Closed));
        assert!(channel.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_writers() {
        let channel = Arc::new(MemoryChannel::new());
        let mut joins = Vec::new();
        for i in 0..16_u8 {
            let channel = channel.clone();
            joins.push(tokio::spawn(async move { channel.write(vec![i]).await }));
        }
        for j in joins {
            j.await.unwrap().unwrap();
        }
        assert_eq!(channel.len().await, 16);
    }
}
