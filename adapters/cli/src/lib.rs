#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Startup plumbing and per-frame orchestration for the Witch Battle binary.

pub mod catalog;
pub mod match_code;
pub mod session;
