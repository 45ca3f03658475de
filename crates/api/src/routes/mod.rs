//! API route handlers

pub mod alerts;
pub mod control;
pub mod status;
