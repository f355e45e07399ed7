//! Resource handles.

use std::sync::Arc;

use cachefront_core::error::Result;
use cachefront_core::types::CallArguments;

use crate::key::build_key;
use crate::orchestrator::ReadThrough;

/// A resource identity bound to a read-through cache.
///
/// Lets callers keep the shape of the uncached API:
///
/// ```rust,ignore
/// let widgets = cache.resource("Widget");
/// let widget = widgets.find(CallArguments::new().arg(42)).await?;
/// ```
pub struct CachedResource<V> {
    identity: String,
    cache: Arc<ReadThrough<V>>,
}

impl<V> Clone for CachedResource<V> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<V> CachedResource<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Binds `identity` to `cache`.
    pub fn new(identity: impl Into<String>, cache: Arc<ReadThrough<V>>) -> Self {
        Self {
            identity: identity.into(),
            cache,
        }
    }

    /// The resource identity as given.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The key a lookup with `arguments` would use.
    pub fn cache_key(&self, arguments: &CallArguments) -> String {
        let (request, _) = arguments.clone().into_request();
        build_key(&self.identity, &request)
    }

    /// Looks the resource up through the cache.
    pub async fn find(&self, arguments: CallArguments) -> Result<V> {
        self.cache.fetch(&self.identity, arguments).await
    }
}
