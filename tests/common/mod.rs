#![allow(dead_code)]

pub use plandag_test_utils::{builders, fake_worker, init_tracing, with_timeout};
