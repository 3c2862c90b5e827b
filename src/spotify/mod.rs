//! # Spotify Integration Module
//!
//! Outbound layer of the application: everything that talks to the Spotify
//! accounts service or the Web API lives here. The rest of the crate never
//! constructs an HTTP request or sees a raw `reqwest::Error`.
//!
//! ## Core Modules
//!
//! - [`auth`] - Accounts client for the authorization-code flow: builds the
//!   authorization URL, exchanges single-use codes for tokens over HTTP Basic
//!   client credentials, refreshes tokens nearing expiry. Implements the
//!   [`crate::session::TokenExchange`] collaborator trait.
//! - [`gateway`] - The Web API gateway: playlist fetch, seeded
//!   recommendations, playback control (start/pause/seek), playlist mutation
//!   and the current user's playlist listing. Stateless; every operation takes
//!   the session context and requires a signed-in session.
//!
//! ## Error Handling
//!
//! Every failure is classified into [`crate::error::ApiError`] before leaving
//! this module. Idempotent reads retry once with a short backoff on network
//! failures; mutating calls go out exactly once. All requests carry a bounded
//! timeout since the remote API is an untrusted network dependency.

pub mod auth;
pub mod gateway;

pub use auth::{AccountsClient, generate_state_token};
pub use gateway::{Gateway, RECOMMENDATION_LIMIT};
