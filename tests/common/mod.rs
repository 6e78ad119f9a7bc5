#![allow(dead_code, unused_imports)]

pub use sprout_test_utils::builders;
pub use sprout_test_utils::fakes;
pub use sprout_test_utils::{init_tracing, wait_until, with_timeout};

/// Raw CLI arguments from string literals.
pub fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
