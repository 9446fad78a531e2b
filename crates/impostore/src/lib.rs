//! # Impostore
//!
//! Room session coordination for a pass-the-phone social deduction word
//! game. A host opens a room, players join from their own devices, and
//! each round secretly deals a word to the civilians and (optionally) a
//! hint to the impostors.
//!
//! The sub-crates do the work; this crate wires them together:
//!
//! - [`HostSession`]: a host's open room, kept alive by a heartbeat task
//!   and deleted when the session is dropped.
//! - [`spawn_sweeper`]: a background task that deletes rooms whose host
//!   stopped sending heartbeats.
//! - [`join_link`] / [`code_from_link`]: shareable join URLs.
//! - [`ImpostoreError`]: one error type over every layer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use impostore::prelude::*;
//!
//! # async fn run() -> Result<(), ImpostoreError> {
//! let coordinator = Arc::new(RoomCoordinator::new(MemoryStore::new()));
//! let host = HostSession::open(Arc::clone(&coordinator), &HostConfig::default()).await?;
//!
//! let player = ParticipantId::new("player-1")?;
//! coordinator.join(host.code(), &player, Some("Anna")).await?;
//! host.start().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
mod link;
mod sweeper;

pub use config::HostConfig;
pub use error::ImpostoreError;
pub use host::HostSession;
pub use link::{code_from_link, join_link};
pub use sweeper::{SweeperHandle, spawn_sweeper};

/// Everything a host or player client usually needs.
pub mod prelude {
    pub use crate::{
        HostConfig, HostSession, ImpostoreError, SweeperHandle, code_from_link, join_link,
        spawn_sweeper,
    };
    pub use impostore_protocol::{
        ParticipantId, Player, Role, RoleCard, Room, RoomCode, RoomSettings, RoomStatus,
    };
    pub use impostore_pulse::PulseConfig;
    pub use impostore_session::{
        Clock, ManualClock, RoomCoordinator, SessionConfig, SessionError, SettingsUpdate,
        SystemClock,
    };
    pub use impostore_store::{MemoryStore, RoomStore, RoomUpdate, Subscription};
    pub use impostore_words::{
        CannedProvider, CatalogSource, WordCatalog, WordList, WordListOutcome, WordListProvider,
    };
}
