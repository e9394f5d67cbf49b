//! Shared test utilities for waypost-navigator tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
