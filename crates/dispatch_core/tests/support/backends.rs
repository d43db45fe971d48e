//! Instrumented routing backends for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dispatch_core::routing::{RouteBackend, RouteLeg, RoutingError};
use h3o::LatLng;

/// Counts every lookup that reaches the wrapped backend.
#[derive(Debug, Clone)]
pub struct CountingBackend<B> {
    inner: B,
    calls: Arc<AtomicUsize>,
}

impl<B> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the call counter, usable after the backend is moved.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<B: RouteBackend> RouteBackend for CountingBackend<B> {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.route(from, to).await
    }
}

/// Never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StallingBackend;

impl RouteBackend for StallingBackend {
    async fn route(&self, _from: LatLng, _to: LatLng) -> Result<RouteLeg, RoutingError> {
        std::future::pending().await
    }
}

/// Always answers with a backend error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingBackend;

impl RouteBackend for FailingBackend {
    async fn route(&self, _from: LatLng, _to: LatLng) -> Result<RouteLeg, RoutingError> {
        Err(RoutingError::Status(503))
    }
}
