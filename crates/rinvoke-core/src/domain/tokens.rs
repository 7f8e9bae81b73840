//! Session tokens (strongly-typed, opaque).
//!
//! # ULID ベースのトークン + Phantom type
//! AccessToken と TransactionToken はどちらも 128-bit の不透明な識別子です。
//! このクレートは中身を解釈せず、値の比較とハッシュだけに使います。
//!
//! `Token<M>` で共通実装を持ち、`M` はマーカー型（PhantomData）として
//! コンパイル時に 2 種類のトークンを区別します。
//! - AccessToken は相関キー兼セッション引数
//! - TransactionToken は任意（開いているトランザクションがある時だけ）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// TokenMarker は各トークン型のマーカー trait
///
/// Display で使うプレフィックスを提供します。
pub trait TokenMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリックなトークン型
///
/// # 例
/// ```ignore
/// let creds = AccessToken::generate();
/// let txn = TransactionToken::generate();
/// // creds と txn は異なる型なので、引数の順番を取り違えるとコンパイルエラー
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token<M: TokenMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<M>,
}

impl<M: TokenMarker> Token<M> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 新しいトークンを発行（開発・テスト用）
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    /// transport が受け取った生の 16 bytes から復元
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self::from_ulid(Ulid::from_bytes(bytes))
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        self.ulid.to_bytes()
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<M: TokenMarker> From<Ulid> for Token<M> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<M: TokenMarker> fmt::Display for Token<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", M::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// ユーザーセッションのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Session {}

impl TokenMarker for Session {
    fn prefix() -> &'static str {
        "session-"
    }
}

/// トランザクションのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transaction {}

impl TokenMarker for Transaction {
    fn prefix() -> &'static str {
        "txn-"
    }
}

/// Identifier of a caller's session; also the request/response correlation key.
pub type AccessToken = Token<Session>;

/// Identifier of an open transaction within a session.
pub type TransactionToken = Token<Transaction>;
