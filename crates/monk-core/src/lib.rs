//! Core types and workflows for the monk research record store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the domain records, the [`store::ResearchStore`] repository trait,
//! and the workflows that run on top of it: file import and claims
//! ([`intake`]), subject derivation ([`derive`]), and the file access check
//! ([`access`]). Every workflow takes the acting account or profile id as an
//! explicit argument.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod account;
pub mod derive;
pub mod error;
pub mod file;
pub mod intake;
pub mod notice;
pub mod payload;
pub mod project;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
