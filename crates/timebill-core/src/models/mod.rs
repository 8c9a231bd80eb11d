//! Configuration and invoice data models.

pub mod config;
pub mod invoice;
