//! ResponseTable - AccessToken から ResponseEnvelope への相関テーブル
//!
//! invocation task はこのテーブルへの参照を受け取りますが、書き込みません。
//! 埋めるのも読み出すのも外部（dispatcher / caller 側）の責務です。

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{AccessToken, ResponseEnvelope};

/// 並行アクセス可能な相関テーブル
///
/// 1 つのトークンにつき生きているレスポンスは高々 1 つ、という前提で
/// `insert` は既存のエントリを置き換えて古い方を返します。
#[derive(Default)]
pub struct ResponseTable {
    entries: RwLock<HashMap<AccessToken, ResponseEnvelope>>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(
        &self,
        creds: AccessToken,
        response: ResponseEnvelope,
    ) -> Option<ResponseEnvelope> {
        self.entries.write().await.insert(creds, response)
    }

    pub async fn take(&self, creds: &AccessToken) -> Option<ResponseEnvelope> {
        self.entries.write().await.remove(creds)
    }

    pub async fn contains(&self, creds: &AccessToken) -> bool {
        self.entries.read().await.contains_key(creds)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
