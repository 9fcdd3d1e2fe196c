//! analogy-core — Item bank model, form assembly, and the session state machine.
//!
//! This crate is the pure layer of the analogy review tool: everything here
//! can be driven and tested without a terminal or a network.

pub mod assembler;
pub mod display;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod recorder;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timestamp;
pub mod traits;

pub use error::BankError;
pub use model::{Bank, BankMeta, ChoiceKey, Item, ItemType, Lang};
pub use session::{Controller, Session, SessionConfig, SessionError, SessionMode};
