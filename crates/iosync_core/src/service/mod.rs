//! Core use-case services.
//!
//! # Responsibility
//! - Expose path-based operations to outer collaborators (CLI, web handlers).
//! - Keep callers decoupled from connection and workbook handling.

pub mod sync_service;
