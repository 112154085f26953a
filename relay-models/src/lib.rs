//! Credential vault and request factories for relay.
//!
//! This crate provides:
//! - A cached credential vault over the OS secure store
//! - Request factories that turn a conversation into provider wire requests
//! - The conversation model both sides share
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  RequestFactory                      │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │   Claude    │  │   Persona   │  │ File context│  │
//! │  │   Factory   │  │   source    │  │  provider   │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼  WireRequest (JSON)
//!                     transport
//!
//! ┌─────────────────────────────────────────────────────┐
//! │                  CredentialVault                     │
//! │     (per-key cache over System Keyring + Env)       │
//! └─────────────────────────────────────────────────────┘
//! ```

mod error;
mod types;

pub mod auth;
pub mod completions;

pub use error::{Error, Result};
pub use types::{ChatTurnParameters, ConversationMessage, ReferencedFile};
