//! # Splashguard Architecture
//!
//! Splashguard replaces a vendor application's splash image with one of your
//! own, keeps a backup of the original, and protects the replacement so the
//! vendor's updater cannot quietly put its own image back. The CLI is one
//! client of the library; nothing below `api.rs` knows it exists.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - Parses arguments, prints messages, sets the exit code    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Resolves targets, owns the worker and settings           │
//! │  - Drains registry events into the settings store           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - Turn engine outcomes into CmdResult messages             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine                                                     │
//! │  worker → batch → replace → {protection, backup}            │
//! │                                  │                          │
//! │                             attributes (trait)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//!
//! Primitives (attributes, copy helpers, settings I/O) return
//! [`error::Result`]. Everything from the protection manager upward returns an
//! [`model::OpOutcome`] instead: a failed file is data, not an error, and a
//! batch never stops because one file failed. A replace whose protection step
//! fails is a success with a warning.
//!
//! Protection state is never stored. It is read back from the filesystem each
//! time; the settings store's list of protected files is only a registry used
//! for bulk cleanup.
//!
//! ## Testing
//!
//! The attribute layer and the elevation check are traits, so engine tests run
//! against [`attributes::memory::MemoryAttributes`] and
//! [`privilege::FixedPrivilege`] over real temp files. The `test_utils` feature
//! exposes the in-memory attribute layer and backup fault injection to
//! `tests/engine_memory.rs`, which only builds with `--features test_utils`.
//!
//! ## Module Overview
//!
//! - [`api`]: facade, entry point for all operations
//! - [`commands`]: per-command result building
//! - [`worker`]: background thread for batch jobs
//! - [`batch`]: batch runner and cancellation
//! - [`replace`]: single-file replace and restore
//! - [`protection`]: composite protect/unprotect
//! - [`backup`]: timestamped backups
//! - [`attributes`]: platform attribute primitives
//! - [`privilege`]: elevated-session query
//! - [`registry`]: protected-file notifications
//! - [`settings`]: persisted settings
//! - [`targets`]: target path providers and validation
//! - [`model`], [`error`]: shared types
//! - [`logging`]: tracing subscriber setup for binaries

pub mod api;
pub mod attributes;
pub mod backup;
pub mod batch;
pub mod commands;
pub mod copy;
pub mod error;
pub mod logging;
pub mod model;
pub mod privilege;
pub mod protection;
pub mod registry;
pub mod replace;
pub mod settings;
pub mod targets;
pub mod worker;
