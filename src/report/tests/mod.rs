//! Unit tests for the report module.
