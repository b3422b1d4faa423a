//! SplitShare - shared expense splitting and balance tracking
//!
//! This library records expenses paid by one user on behalf of a group,
//! divides each expense among its participants, and aggregates who owes
//! whom across everything recorded.
//!
//! # Architecture
//!
//! - `models`: users, expenses, allocations, and the exact `Money` and
//!   `Percentage` types
//! - `services::split`: the split calculator (equal, exact, percentage)
//! - `services::balance`: the balance aggregator over a snapshot of expenses
//! - `services`: user and expense workflows on top of storage
//! - `storage`: JSON file storage with atomic writes
//! - `reports`, `export`, `display`: balance sheet, CSV/JSON/YAML export,
//!   terminal formatting
//! - `cli`: clap subcommands used by the `splitshare` binary
//! - `config`, `error`: paths, settings, and error types
//!
//! # Example
//!
//! ```rust,ignore
//! use splitshare_cli::models::{Money, ParticipantInput, SplitMethod, UserId};
//! use splitshare_cli::services::compute_allocations;
//!
//! let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
//! let shares = compute_allocations(
//!     Money::from_cents(10000),
//!     SplitMethod::Equal,
//!     &[ParticipantInput::equal(a), ParticipantInput::equal(b), ParticipantInput::equal(c)],
//! )?;
//! // 33.34, 33.33, 33.33
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ShareError, ShareResult, SplitError};
