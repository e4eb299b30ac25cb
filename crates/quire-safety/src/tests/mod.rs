//! Test suites for the file safety primitives.

mod temp_scope;
mod transaction;
