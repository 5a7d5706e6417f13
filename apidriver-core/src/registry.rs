//! Route registry.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::route_entries;
use crate::template::UriTemplate;
use crate::{CallData, RequestPlan, Result, RouteDescriptor};

/// Descriptors keyed by qualified name, remembering registration order.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, Arc<RouteDescriptor>>,
    order: Vec<String>,
}

impl RouteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one descriptor per route of `document`, in document order.
    ///
    /// `on_route_config_created` runs for each descriptor before it is stored.
    /// An error from the listener stops initialization and is returned.
    pub fn initialize<F>(
        &mut self,
        document: &Value,
        template: Arc<dyn UriTemplate>,
        mut on_route_config_created: F,
    ) -> Result<()>
    where
        F: FnMut(&Arc<RouteDescriptor>) -> Result<()>,
    {
        for (name, config) in route_entries(document)? {
            let descriptor = Arc::new(RouteDescriptor::with_template(
                name,
                config,
                template.clone(),
            ));
            on_route_config_created(&descriptor)?;
            self.register(descriptor);
        }

        tracing::debug!(routes = self.len(), "Route registry initialized");
        Ok(())
    }

    /// Store a descriptor, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: Arc<RouteDescriptor>) {
        let name = descriptor.full_name().to_string();
        if self.routes.insert(name.clone(), descriptor).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a descriptor.
    pub fn get(&self, name: &str) -> Option<&Arc<RouteDescriptor>> {
        self.routes.get(name)
    }

    /// Render the plan of a named route; `None` when the name is unknown.
    pub fn get_route_json(&self, name: &str, data: &CallData) -> Result<Option<RequestPlan>> {
        self.routes
            .get(name)
            .map(|descriptor| descriptor.render(data))
            .transpose()
    }

    /// Registered names, first registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
