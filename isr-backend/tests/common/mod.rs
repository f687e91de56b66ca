//! Shared test stores.
#![allow(dead_code)]

mod test_backend;

pub use test_backend::{FailingBackend, TestBackend};
