//! Worker count selection
//!
//! Each worker drives one external encoder process, and encoders are
//! themselves multi-threaded, so the automatic worker count leaves cores for
//! the children instead of starting one task per core.

/// Worker count used when none is requested.
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound for the automatic worker count.
const MAX_AUTO_WORKERS: usize = 8;

/// Threads assumed per encoder child process when sizing automatically.
const CHILD_THREADS: usize = 2;

/// Worker count for a run.
///
/// - `None` gives [`DEFAULT_WORKERS`]
/// - `Some(0)` sizes the pool from the CPU count
/// - `Some(n)` is used as-is
pub fn resolve_worker_count(requested: Option<usize>) -> usize {
    match requested {
        None => DEFAULT_WORKERS,
        Some(0) => auto_worker_count(num_cpus::get()),
        Some(n) => n,
    }
}

/// Reserve 20% of cores (1 or 2) for the OS, then give each worker
/// [`CHILD_THREADS`] cores.
fn auto_worker_count(total_cores: usize) -> usize {
    let reserved = ((total_cores as f64 * 0.2).ceil() as usize).clamp(1, 2);
    let available = total_cores.saturating_sub(reserved).max(1);
    (available / CHILD_THREADS).clamp(1, MAX_AUTO_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_explicit() {
        assert_eq!(resolve_worker_count(None), 4);
        assert_eq!(resolve_worker_count(Some(1)), 1);
        assert_eq!(resolve_worker_count(Some(12)), 12);
    }

    #[test]
    fn test_auto_is_bounded() {
        let n = resolve_worker_count(Some(0));
        assert!((1..=MAX_AUTO_WORKERS).contains(&n));
    }

    #[test]
    fn test_auto_worker_count_table() {
        assert_eq!(auto_worker_count(1), 1);
        assert_eq!(auto_worker_count(2), 1);
        assert_eq!(auto_worker_count(4), 1);
        assert_eq!(auto_worker_count(10), 4);
        assert_eq!(auto_worker_count(64), 8);
    }
}
