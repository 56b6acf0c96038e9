use std::time::Duration;

/// Resolve to `value` after `delay`. Stands in for a real request in demos
/// and tests.
pub async fn resolve_after<T>(value: T, delay: Duration) -> T {
    tokio::time::sleep(delay).await;
    value
}
