//! Integration tests against a real PostgreSQL database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

mod common;
mod lending;
mod returns;
