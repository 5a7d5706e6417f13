//! The callable namespace tree.
//!
//! Every route `a.b.c` becomes an [`Endpoint`] named `c` inside the nested
//! namespaces `a` and `b`. Children keep document order.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::PATH_SEPARATOR;
use crate::custom::{CustomImplementation, CustomImplementations};
use crate::executor::{BodyEncoding, DriverContext};
use crate::result::CallOutput;
use crate::{CallData, NormalizedResult, RequestPlan, Result, RouteDescriptor, RouteError};

/// A level of the tree.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    children: Vec<(String, Node)>,
}

/// Child of a namespace.
#[derive(Debug, Clone)]
pub enum Node {
    /// Nested namespace.
    Namespace(Namespace),
    /// Callable leaf.
    Endpoint(Endpoint),
}

impl Namespace {
    /// Direct child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)
    }

    /// Direct child namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        match self.get(name)? {
            Node::Namespace(namespace) => Some(namespace),
            Node::Endpoint(_) => None,
        }
    }

    /// Direct child endpoint by name.
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        match self.get(name)? {
            Node::Endpoint(endpoint) => Some(endpoint),
            Node::Namespace(_) => None,
        }
    }

    /// Endpoint at a dotted path below this namespace.
    pub fn resolve(&self, path: &str) -> Option<&Endpoint> {
        let (parents, leaf) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };
        let mut current = self;
        if let Some(parents) = parents {
            for segment in parents.split(PATH_SEPARATOR) {
                current = current.namespace(segment)?;
            }
        }
        current.endpoint(leaf)
    }

    /// Child names, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }

    /// Children, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether this namespace has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(child, _)| child == name)
    }

    /// Attach `endpoint` at `sequence.name`, creating namespaces on the way.
    ///
    /// An existing endpoint with the same path is replaced. On conflict the
    /// dotted path where the tree disagrees is returned.
    pub(crate) fn attach(
        &mut self,
        sequence: &[String],
        name: &str,
        endpoint: Endpoint,
    ) -> std::result::Result<(), String> {
        let mut current = self;
        for (depth, segment) in sequence.iter().enumerate() {
            let index = match current.position(segment) {
                Some(index) => index,
                None => {
                    current
                        .children
                        .push((segment.clone(), Node::Namespace(Namespace::default())));
                    current.children.len() - 1
                }
            };
            current = match &mut current.children[index].1 {
                Node::Namespace(namespace) => namespace,
                Node::Endpoint(_) => return Err(sequence[..=depth].join(".")),
            };
        }

        match current.position(name) {
            Some(index) => match &mut current.children[index].1 {
                Node::Endpoint(existing) => {
                    *existing = endpoint;
                    Ok(())
                }
                Node::Namespace(_) => Err(endpoint.full_name().to_string()),
            },
            None => {
                current
                    .children
                    .push((name.to_string(), Node::Endpoint(endpoint)));
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
enum EndpointKind {
    Generated,
    Custom(Arc<dyn CustomImplementation>),
}

/// Callable leaf bound to one route.
#[derive(Clone)]
pub struct Endpoint {
    descriptor: Arc<RouteDescriptor>,
    kind: EndpointKind,
    context: Arc<DriverContext>,
}

impl Endpoint {
    /// Qualified route name.
    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// The route this endpoint renders.
    pub fn descriptor(&self) -> &Arc<RouteDescriptor> {
        &self.descriptor
    }

    /// Whether calls go to a custom implementation instead of HTTP.
    pub fn is_custom(&self) -> bool {
        matches!(self.kind, EndpointKind::Custom(_))
    }

    /// Render the request plan for `data` without sending it.
    pub fn render(&self, data: &CallData) -> Result<RequestPlan> {
        self.descriptor.render(data)
    }

    /// Call the route.
    ///
    /// Configuration problems (missing placeholder, bad URL) are returned as
    /// `Err` before any I/O. Transport and HTTP failures are folded into the
    /// returned [`NormalizedResult`].
    pub async fn call(&self, data: impl Into<CallData>) -> Result<NormalizedResult> {
        let data = data.into();
        let plan = self.descriptor.render(&data)?;
        let result = self.execute(plan, data.clone()).await?;
        if !self.is_custom() {
            self.context.log_verbose(self.full_name(), &data, &result);
        }
        Ok(result)
    }

    /// Call the route and shape the result per the driver's `multi_args` flag.
    pub async fn call_output(&self, data: impl Into<CallData>) -> Result<CallOutput> {
        let result = self.call(data).await?;
        Ok(CallOutput::new(result, self.context.multi_args))
    }

    /// Callback form of [`call`](Self::call).
    ///
    /// Rendering and URL resolution happen before this returns; the request
    /// itself runs on a spawned task which hands `(error, body, status_code)`
    /// to `done`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn call_with<F>(&self, data: impl Into<CallData>, done: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Option<Value>, Option<Value>, Option<u16>) + Send + 'static,
    {
        let data = data.into();
        let plan = self.descriptor.render(&data)?;
        if !self.is_custom() {
            self.context.resolve_url(self.full_name(), &plan.uri)?;
        }

        let endpoint = self.clone();
        Ok(tokio::spawn(async move {
            match endpoint.execute(plan, data.clone()).await {
                Ok(result) => {
                    let (error, body, status_code) = result.clone().into_parts();
                    done(error, body, status_code);
                    if !endpoint.is_custom() {
                        endpoint
                            .context
                            .log_verbose(endpoint.full_name(), &data, &result);
                    }
                }
                Err(e) => done(Some(Value::String(e.to_string())), None, None),
            }
        }))
    }

    async fn execute(&self, plan: RequestPlan, data: CallData) -> Result<NormalizedResult> {
        match &self.kind {
            EndpointKind::Custom(handler) => Ok(handler.call(plan, data).await),
            EndpointKind::Generated => {
                self.context
                    .send(self.full_name(), plan, BodyEncoding::Auto)
                    .await
            }
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("route", &self.full_name())
            .field("custom", &self.is_custom())
            .finish()
    }
}

/// Builds the tree while the registry is initialized.
pub(crate) struct TreeBuilder {
    root: Namespace,
    context: Arc<DriverContext>,
    customs: CustomImplementations,
}

impl TreeBuilder {
    pub(crate) fn new(context: Arc<DriverContext>, customs: CustomImplementations) -> Self {
        Self {
            root: Namespace::default(),
            context,
            customs,
        }
    }

    /// Attach an endpoint for a freshly created descriptor.
    pub(crate) fn on_route_config_created(
        &mut self,
        descriptor: &Arc<RouteDescriptor>,
    ) -> Result<()> {
        let kind = match descriptor.raw_config().custom_implementation.as_deref() {
            Some(implementation) => EndpointKind::Custom(
                self.customs.get(implementation).ok_or_else(|| {
                    RouteError::MissingCustomImplementation {
                        route: descriptor.full_name().to_string(),
                        implementation: implementation.to_string(),
                    }
                })?,
            ),
            None => EndpointKind::Generated,
        };

        let endpoint = Endpoint {
            descriptor: descriptor.clone(),
            kind,
            context: self.context.clone(),
        };
        self.root
            .attach(descriptor.namespace_sequence(), descriptor.name(), endpoint)
            .map_err(|path| RouteError::NamespaceConflict {
                route: descriptor.full_name().to_string(),
                path,
            })
    }

    pub(crate) fn finish(self) -> Namespace {
        self.root
    }
}
