//! Integration tests for the dictionary store and localization engine

mod bootstrap;
mod engine_passes;
mod migration;
mod store_roundtrip;
mod support;
mod transfer;
