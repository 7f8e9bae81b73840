//! ServiceRegistry - メソッドの登録と公開範囲の管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Arc による共有所有権
//! - 登録時に分類を決め、呼び出し時はテーブルを引くだけ
//!
//! リモートから呼べるのは `Access::Exposed` のメソッドだけです。
//! 無い・非公開・restricted はどれも `InvocationError::Lookup` になり、
//! デフォルト値で黙って成功することはありません。

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::{InvocationError, LookupReason};

use super::method::Method;

/// Per-method capability marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Callable through remote dispatch.
    Exposed,
    /// Explicitly marked as off-limits to remote callers.
    Restricted,
    /// Registered for local use only.
    Hidden,
}

struct MethodEntry {
    access: Access,
    method: Arc<dyn Method>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("method '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// ServiceRegistry は 1 つのサービスオブジェクトのメソッド表
///
/// # 使用例
/// ```ignore
/// let mut registry = ServiceRegistry::new();
/// registry.expose("echo", from_fn(|mut args| Ok(args.remove(0))))?;
/// registry.restrict("shutdown", ShutdownMethod)?;
///
/// let method = registry.resolve("echo")?;
/// ```
///
/// # 設計
/// - 初期化時に構築（mutable）
/// - 実行時は `Arc<ServiceRegistry>` として共有（immutable、ロック不要）
#[derive(Default)]
pub struct ServiceRegistry {
    methods: HashMap<String, MethodEntry>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    pub fn register<M: Method + 'static>(
        &mut self,
        name: impl Into<String>,
        access: Access,
        method: M,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.methods.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        let entry = MethodEntry {
            access,
            method: Arc::new(method),
        };
        self.methods.insert(name, entry);
        Ok(())
    }

    pub fn expose<M: Method + 'static>(
        &mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<(), RegistryError> {
        self.register(name, Access::Exposed, method)
    }

    pub fn restrict<M: Method + 'static>(
        &mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<(), RegistryError> {
        self.register(name, Access::Restricted, method)
    }

    pub fn hide<M: Method + 'static>(
        &mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<(), RegistryError> {
        self.register(name, Access::Hidden, method)
    }

    /// Security gate: return the method only if it may be called remotely.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Method>, InvocationError> {
        let entry = self
            .methods
            .get(name)
            .ok_or_else(|| InvocationError::lookup(name, LookupReason::NotFound))?;

        match entry.access {
            Access::Exposed => Ok(entry.method.clone()),
            Access::Restricted => Err(InvocationError::lookup(name, LookupReason::Restricted)),
            Access::Hidden => Err(InvocationError::lookup(name, LookupReason::NotExposed)),
        }
    }

    pub fn access(&self, name: &str) -> Option<Access> {
        self.methods.get(name).map(|e| e.access)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
