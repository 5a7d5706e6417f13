//! Custom route implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::{CallData, NormalizedResult, RequestPlan};

/// Handler that replaces generated HTTP execution for a route.
///
/// It receives the rendered plan and the raw call data and is fully
/// responsible for any I/O.
#[async_trait]
pub trait CustomImplementation: Send + Sync {
    /// Handle one call.
    async fn call(&self, plan: RequestPlan, data: CallData) -> NormalizedResult;
}

struct FnImplementation<F>(F);

#[async_trait]
impl<F, Fut> CustomImplementation for FnImplementation<F>
where
    F: Fn(RequestPlan, CallData) -> Fut + Send + Sync,
    Fut: Future<Output = NormalizedResult> + Send + 'static,
{
    async fn call(&self, plan: RequestPlan, data: CallData) -> NormalizedResult {
        (self.0)(plan, data).await
    }
}

/// Named custom implementations, looked up by routes'
/// `customImplementation` field.
#[derive(Clone, Default)]
pub struct CustomImplementations {
    handlers: HashMap<String, Arc<dyn CustomImplementation>>,
}

impl CustomImplementations {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register(
        mut self,
        name: impl Into<String>,
        handler: impl CustomImplementation + 'static,
    ) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Register an async closure under `name`.
    pub fn register_fn<F, Fut>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(RequestPlan, CallData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NormalizedResult> + Send + 'static,
    {
        self.register(name, FnImplementation(handler))
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomImplementation>> {
        self.handlers.get(name).cloned()
    }

    /// Whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CustomImplementations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CustomImplementations")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl CustomImplementation for Echo {
        async fn call(&self, plan: RequestPlan, data: CallData) -> NormalizedResult {
            NormalizedResult::success(Some(json!({"uri": plan.uri, "data": data})), None)
        }
    }

    #[tokio::test]
    async fn test_trait_and_closure_handlers() {
        let table = CustomImplementations::new()
            .register("echo", Echo)
            .register_fn("fail", |plan: RequestPlan, _data: CallData| async move {
                NormalizedResult::failure(json!(format!("refused {}", plan.uri)), None)
            });

        assert_eq!(table.len(), 2);
        assert!(table.contains("echo"));
        assert!(table.get("missing").is_none());

        let plan = RequestPlan::new(Method::GET, "/x");
        let echoed = table
            .get("echo")
            .unwrap()
            .call(plan.clone(), CallData::new().param("a", 1))
            .await;
        assert_eq!(echoed.body(), Some(&json!({"uri": "/x", "data": {"a": 1}})));

        let failed = table.get("fail").unwrap().call(plan, CallData::new()).await;
        assert_eq!(failed.error(), Some(&json!("refused /x")));
    }

    #[test]
    fn test_debug_lists_names() {
        let table = CustomImplementations::new().register("b", Echo).register("a", Echo);
        assert_eq!(
            format!("{:?}", table),
            r#"CustomImplementations { handlers: ["a", "b"] }"#
        );
    }
}
