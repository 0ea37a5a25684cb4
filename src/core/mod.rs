//! # Core Application Logic
//!
//! This module contains Drugbot's business logic: sessions, messages and
//! the rules that keep them in sync with the backend.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │ ── runs effects on ───▶  │    API     │
//!     │  Adapter   │     tokio tasks          │  (reqwest) │
//!     │ (ratatui)  │ ◀── result Actions ────  │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`session`] / [`message`]: the conversation data model
//! - [`config`]: `~/.drugbot/config.toml` and override resolution
//! - [`locale`]: user-facing strings

pub mod action;
pub mod config;
pub mod locale;
pub mod message;
pub mod session;
pub mod state;
