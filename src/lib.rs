//! # Polaris Tools - catalog administration requests
//!
//! Turns loosely typed tool calls against Apache Polaris into REST requests:
//! - Operation alias resolution per entity kind
//! - Path and multi-level namespace percent-encoding
//! - Request compilers for tables, namespaces, principals, principal roles,
//!   catalog roles, policies and catalogs
//! - Authorization: none, static bearer token, or OAuth client credentials
//!   with a realm-keyed token cache
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────────────────┐
//!   tool call    →   │            ToolRegistry              │
//!   (name, args)     │  ┌──────────┐   ┌───────────────┐    │
//!                    │  │ Compiler │ → │ Authorization │    │
//!                    │  │  (pure)  │   │   Provider    │    │
//!                    │  └──────────┘   └───────┬───────┘    │
//!                    │                  ┌──────┴──────┐     │
//!                    │                  │ TokenCache  │     │
//!                    │                  │ (per realm) │     │
//!                    │                  └─────────────┘     │
//!                    │  ┌────────────────────────────┐      │
//!                    │  │ RestExecutor (reqwest)     │ → Polaris
//!                    │  └────────────────────────────┘      │
//!                    └──────────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod compiler;
pub mod executor;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
