//! # Rendezvous Session Server Library
//!
//! This library provides the authoritative server for a shared real-time
//! session: participants move freely in a normalized 2D space, and three
//! fixed rendezvous objectives each run timed collection rounds for groups
//! of two or more co-located participants.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server owns the definitive session state. Objective phase machines,
//! the collectible entity field, and the group history ledger are advanced
//! only by the server's fixed-cadence tick; clients receive and conform to
//! the broadcast snapshots.
//!
//! ### Connection Management
//! Each connection is assigned an opaque participant id, entered into the
//! registry at a random spawn position, announced to other connections, and
//! removed again on disconnect or timeout.
//!
//! ### State Broadcasting
//! Every tick serializes the entire mutable state — registry positions, all
//! objective state, and the collectible field — into one snapshot pushed to
//! every connection. No diffing, no acknowledgements, no backpressure.
//!
//! ## Architecture Design
//!
//! ### Single Logical Thread of Control
//! Inbound packets and tick expiry are arms of one `select!` loop, so each
//! tick runs to completion before the next inbound update is applied.
//! Position updates are the only externally writable state and land in the
//! registry between ticks; everything else is written by the tick alone.
//!
//! ### Tick Ordering
//! Within a tick, objective state machines advance first (their Fusion
//! edges start and end collectible rounds), then the entity field, then
//! serialization — a snapshot can never show collectibles belonging to a
//! round its objective has not reached.
//!
//! ## Module Organization
//!
//! - [`registry`]: participant id → position map, inbound update clamping
//! - [`ledger`]: anti-repeat history of exact completed groups
//! - [`objective`]: the Idle → Gathering → Fusion → Lockback state machine
//! - [`entity_field`]: collectible spawn, drift, capture, replenishment
//! - [`simulation`]: the context tying the above together, one `advance`
//!   per tick
//! - [`client_manager`]: connection roster, id assignment, timeouts
//! - [`network`]: UDP transport, packet handling, the tick loop itself
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 10 ticks per second, up to 64 connections
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         Duration::from_millis(100),
//!         64
//!     ).await?;
//!
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod entity_field;
pub mod ledger;
pub mod network;
pub mod objective;
pub mod registry;
pub mod simulation;
