//! rsvp-core library.
//!
//! Guests of an event are grouped into invitations: every guest carries a
//! positive `group_id` scoped to its event, and all guests sharing one are
//! tracked and answered together. This crate owns the rules for allocating
//! those numbers, keeping a batch on a single invitation, ingesting CSV guest
//! lists and reconciling a submitted invitation against stored state.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::RsvpError`]; config and
//!   plumbing use `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Storage**: everything persists through [`store::GuestStore`]. The core
//!   takes no locks; callers serialize writers per event (see [`lock`]).

pub mod alloc;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod lock;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod store;
pub mod validate;

pub use alloc::next_group_id;
pub use error::{RsvpError, StoreError};
pub use ingest::{HeaderMode, IngestOptions, IngestReport, ingest_csv, ingest_rows};
pub use model::guest::{
    EventId, GroupId, GuestDraft, GuestId, GuestRecord, PublicGuest, RawGroupId, ResponseStatus,
};
pub use normalize::{normalize, normalized};
pub use reconcile::{
    create_guest, create_invitation, reconcile, submit_invitation, update_guest,
};
pub use store::{GuestStore, MemoryStore};
pub use validate::{GroupBatch, GroupResolution, validate_group_consistency};
