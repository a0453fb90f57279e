//! Shared test utilities

#![allow(dead_code)]

pub mod project;

pub use project::{Layout, TestProject, declaration};
