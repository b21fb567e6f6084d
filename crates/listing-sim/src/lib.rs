//! Listing Simulator
//!
//! Replays a listing flow described in TOML (actor, existing entry, draft
//! fields, files to stage, reorder/remove operations, injected failures)
//! against the in-memory services and reports how the submission ended.
//!
//! # Example
//!
//! ```rust,no_run
//! use listing_core::ListingConfig;
//! use listing_sim::{run, Scenario};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scenario = Scenario::load("scenarios/create.toml")?;
//! let outcome = run(&scenario, &ListingConfig::default()).await;
//! println!("{}", outcome.render_text());
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod runner;
pub mod scenario;

pub use runner::{run, OpResult, Outcome, StageResult, Status};
pub use scenario::{ActorSpec, AssetSpec, DraftSpec, EntrySpec, FailureSpec, FileSpec, Op, Scenario, ScenarioError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
