//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **MemoryChannel**: 書き込みを記録するだけの channel
//! - **MpscChannel**: tokio mpsc への橋渡し
//! - **ResponseTable**: 相関テーブル
//!
//! 本番の transport（共有メモリなど）は別クレートに置く想定です。

pub mod memory_channel;
pub mod mpsc_channel;
pub mod response_table;

pub use self::memory_channel::MemoryChannel;
pub use self::mpsc_channel::MpscChannel;
pub use self::response_table::ResponseTable;
