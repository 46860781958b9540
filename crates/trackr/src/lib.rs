//! Trackr - project-scoped issue tracking over a document store.
//!
//! This crate holds everything below the HTTP layer: the issue domain
//! types, markup sanitization, typed parsing of untrusted request fields,
//! translation of query parameters into store filters, and the storage
//! backends (in-memory and MongoDB).

#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod input;
pub mod query;
pub mod sanitize;
pub mod storage;
