//! Core business logic for Claimflow.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The approval decision engine, its data model, and the store seams live here.
//!
//! # Modules
//!
//! - `approval` - Approval chain initialization, decision processing, and scope

pub mod approval;
