//! Integration tests for `mbox-dp`
//!
//! Every test drives the real binary against a temporary workspace and
//! inspects the files it leaves behind.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **add**: repo discovery and the initial activation
//! - **activation**: `activate` / `deactivate` addressing
//! - **depend**: dependency overrides and the changed-dependencies lock
//! - **errors**: failures exit non-zero with a readable message
//! - **feature**: `feature start` and `status`

#[path = "../common/mod.rs"]
mod common;

mod activation;
mod add;
mod depend;
mod errors;
mod feature;
