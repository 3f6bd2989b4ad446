//! Core chat components
//!
//! This module contains the logic that moves messages between the
//! conversation store and the agent backend.

mod dispatcher;
mod extract;

pub use dispatcher::{Dispatcher, InFlightPolicy, Rejection, SendOutcome, DEFAULT_USER_ID};
