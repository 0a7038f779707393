//! Core components for signing object storage requests.
//!
//! This crate provides the service-independent building blocks the ossign
//! signers are made of.
//!
//! ## Overview
//!
//! - **RequestDescriptor**: what a transport knows about a request before it
//!   is sent (method, resource, headers, query, body metadata). Signers
//!   canonicalize it and append their auth material to it.
//! - **HeaderList**: case-preserving header list with case-insensitive
//!   lookup and a lazily built lower-case index.
//! - **Context**: access to environment variables for configuration.
//! - **Error**: the error type shared by all signers.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use ossign_core::RequestDescriptor;
//!
//! let desc = RequestDescriptor::new(Method::GET, "/bucket/object.txt")
//!     .with_header("x-oss-meta-author", "alice")
//!     .with_query("acl", "");
//!
//! assert_eq!(desc.headers.get("X-OSS-Meta-Author"), Some("alice"));
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Keyed hash utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, OsEnv, StaticEnv};

mod api;
pub use api::SigningCredential;
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{normalize_header_name, HeaderList, RequestDescriptor};
