//! # Epdash Device
//!
//! The device-side controller: a perpetual, strictly single-threaded state
//! machine that cycles through connect, fetch, render, idle, and the error
//! and provisioning branches.
//!
//! ## Design Rules
//!
//! The reference hardware has no recovery UI: if the control loop ever
//! blocks, the device is bricked. Everything here follows from that:
//!
//! - one state is active at a time; each [`DeviceMachine::step`] call does
//!   a bounded amount of work and returns control to the loop;
//! - every operation that can block (connect, fetch, draw) runs under an
//!   explicit timeout; on timeout it is a failure routed to the error
//!   branch, never a hang;
//! - nothing in this crate can fail the loop itself - unexpected
//!   conditions map to the `Error` state with exponential backoff;
//! - state survives power cycles through a versioned record in a
//!   [`epdash_store::StateStore`], written on every transition.
//!
//! The server is visible only through the wire contracts
//! ([`epdash_sync::messages`], [`epdash_pair::messages`]) behind the
//! endpoint traits in [`endpoints`].

pub mod config;
pub mod endpoints;
pub mod error;
pub mod machine;
pub mod state;

pub use config::DeviceConfig;
pub use endpoints::{DisplayPanel, NetworkLink, PairingEndpoint, StaticScreen, ZoneEndpoint};
pub use error::{DeviceError, Result, StateDecodeError};
pub use machine::{DeviceMachine, StepOutcome};
pub use state::{DeviceState, PersistedState, BOUND_CONFIG_KEY, STATE_KEY, STATE_SCHEMA_VERSION};
