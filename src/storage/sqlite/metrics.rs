//! Operation metrics for the record store.

use std::time::Instant;

/// Records the count and latency of one store operation.
///
/// Emits `storage_operations_total` and `storage_operation_duration_ms`,
/// both labelled with the operation name and `success`/`error` status.
pub fn record_operation_metrics<T, E>(
    operation: &'static str,
    start: Instant,
    result: &Result<T, E>,
) {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::counter!(
        "storage_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}
