//! Cross-module scene tests

mod mirror_integration;
