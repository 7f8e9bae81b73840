//! ServiceBuilder - サービスのメソッド表の構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use crate::typed::{Access, Method, RegistryError, ServiceRegistry};

/// ServiceBuilder はサービスを構築
///
/// # 使用例
/// ```ignore
/// let service = ServiceBuilder::new()
///     .expose("echo", EchoMethod)?
///     .restrict("shutdown", ShutdownMethod)?
///     .expect_methods(&["echo", "getServerVersion"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_methods() でリモートから呼べるべきメソッドを宣言
/// - build() 時に全て Exposed で登録されているかチェック
/// - 不足があれば BuildError を返す
pub struct ServiceBuilder {
    registry: ServiceRegistry,
    expected_methods: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing exposed methods: {0:?}. These methods were expected but not exposed.")]
    MissingMethods(Vec<String>),
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            registry: ServiceRegistry::new(),
            expected_methods: None,
        }
    }

    pub fn expose<M: Method + 'static>(
        mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<Self, RegistryError> {
        self.registry.register(name, Access::Exposed, method)?;
        Ok(self)
    }

    pub fn restrict<M: Method + 'static>(
        mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<Self, RegistryError> {
        self.registry.register(name, Access::Restricted, method)?;
        Ok(self)
    }

    pub fn hide<M: Method + 'static>(
        mut self,
        name: impl Into<String>,
        method: M,
    ) -> Result<Self, RegistryError> {
        self.registry.register(name, Access::Hidden, method)?;
        Ok(self)
    }

    pub fn expect_methods(mut self, names: &[&str]) -> Self {
        self.expected_methods = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// # 検証
    /// - expect_methods() の各メソッドが `Access::Exposed` で登録されているか
    /// - Restricted / Hidden で登録されているものも不足として扱う
    pub fn build(self) -> Result<ServiceRegistry, BuildError> {
        if let Some(expected) = &self.expected_methods {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| self.registry.access(name) != Some(Access::Exposed))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingMethods(missing));
            }
        }
        Ok(self.registry)
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::typed::from_fn;

    fn noop() -> impl Method {
        from_fn(|_| Ok(Value::Null))
    }

    #[test]
    fn test_build_success() {
        let service = ServiceBuilder::new()
            .expose("echo", noop())
            .unwrap()
            .expect_methods(&["echo"])
            .build();
        assert!(service.is_ok());
    }

    #[test]
    fn test_build_missing_methods() {
        let service = ServiceBuilder::new()
            .expose("echo", noop())
            .unwrap()
            .restrict("admin", noop())
            .unwrap()
            .expect_methods(&["echo", "admin", "getServerVersion"])
            .build();
        assert!(matches!(
            service,
            Err(BuildError::MissingMethods(missing))
                if missing == vec!["admin".to_string(), "getServerVersion".to_string()]
        ));
    }

    #[test]
    fn test_build_no_expect_methods() {
        let service = ServiceBuilder::new()
            .hide("helper", noop())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(service.access("helper"), Some(Access::Hidden));
    }

    #[test]
    fn test_duplicate_name() {
        let result = ServiceBuilder::new()
            .expose("echo", noop())
            .unwrap()
            .hide("echo", noop());
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));
    }
}
