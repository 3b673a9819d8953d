//! Shared components and utilities for the Pandora simulator.
//!
//! This crate holds the numeric building blocks that are not tied to a
//! particular instrument: interpolation, integration, deterministic parallel
//! processing, and detector noise primitives.

pub mod algo;
pub mod image_proc;
