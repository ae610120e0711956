//! Integration tests

mod cache_tests;
mod health_tests;
