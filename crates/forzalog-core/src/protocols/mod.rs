//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte counts and ranges (source of truth)
//! - `reader`: safe byte access and wire conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; sources and the recorder handle
//! sockets and files.

pub mod forza;
