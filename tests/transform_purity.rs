use std::fs;
use std::path::Path;

/// The transform runs on every worker in parallel; it must not take locks or log.
#[test]
fn transform_does_not_synchronize() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("transform.rs");
    let src = fs::read_to_string(path).expect("failed to read transform.rs");
    for forbidden in ["assert_invariant(", "Mutex", "tracing::", "info!(", "debug!("] {
        assert!(
            !src.contains(forbidden),
            "transform must stay lock-free and silent, found `{forbidden}`"
        );
    }
}

/// Queue, collector and latch assert invariants while holding their own lock;
/// only the lock-free tier may be used there.
#[test]
fn critical_sections_use_lock_free_invariants() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    for file in ["queue.rs", "collector.rs", "latch.rs"] {
        let src = fs::read_to_string(src_dir.join(file))
            .unwrap_or_else(|e| panic!("failed to read {file}: {e}"));
        assert!(
            !src.contains("assert_invariant("),
            "{file} calls the logging invariant tier under its lock"
        );
        assert!(
            src.contains("assert_invariant_rt_safe("),
            "{file} no longer asserts its invariants"
        );
    }
}
