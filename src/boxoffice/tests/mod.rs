//! Engine-level test suites.

mod snapshot_tests;
