//! Hook for pacing outbound requests.

use async_trait::async_trait;

/// Awaited before every request a client sends, including session setup.
/// `tickr_lib`'s rate limiter is the production implementation.
#[async_trait]
pub trait RequestGate: Send + Sync {
    async fn wait(&self);
}
