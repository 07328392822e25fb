// src/engine/mod.rs
//
// The adaptive diagnostic core. Everything here is pure and synchronous;
// handlers call into it inside a store transaction where atomicity matters.

pub mod difficulty;
pub mod policy;
pub mod scoring;
pub mod selector;
pub mod submission;
