//! Integration tests for the dictionary store and localization engine

mod integration;
