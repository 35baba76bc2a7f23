//! Integration test suites for the box-office engine.

mod common;
mod concurrency_tests;
mod lifecycle_tests;
mod pricing_props;
