//! Unit tests for the facade.
