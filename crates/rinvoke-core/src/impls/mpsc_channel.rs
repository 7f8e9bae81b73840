//! MpscChannel - tokio の mpsc を OutboundChannel として使うアダプタ
//!
//! 受信側（Receiver）は transport か、デモでは CLI が持ちます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::{ChannelError, OutboundChannel};

pub struct MpscChannel {
    tx: mpsc::Sender<Vec<u8>>,
}

impl MpscChannel {
    pub fn new(tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self { tx }
    }

    /// bounded channel を作り、送信側をラップして返す
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl OutboundChannel for MpscChannel {
    async fn write(&self, message: Vec<u8>) -> Result<(), ChannelError> {
        // receiver が drop されていたら送れない
        self.tx.send(message).await.map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwards_to_receiver() {
        let (channel, mut rx) = MpscChannel::bounded(4);
        channel.write(vec![9, 9]).await.unwrap();
        assert_eq!(rx.recv().await, Some(vec![9, 9]));
    }

    #[tokio::test]
    async fn dropped_receiver_is_closed() {
        let (channel, rx) = MpscChannel::bounded(1);
        drop(rx);
        let err = channel.write(vec![1]).await.unwrap_err();
        assert!(matches!(err, ChannelError::Closed));
    }
}
