//! Integration tests for tubecache
//!
//! Every test runs a real `Catalog` and `WorkerPool` against the in-memory
//! `FakeSource` / `FakeResolver` from `helpers`, so no network is needed.
//! Run with: cargo test --test integration

mod helpers;

mod audio;
mod batching;
mod identity;
mod playlist;
