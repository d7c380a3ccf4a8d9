//! Error types for GroundLink
//!
//! # Recovery Strategies
//!
//! Different error types require different recovery approaches:
//!
//! - **`Serial`** / **`Io`**: link or socket I/O failure. The dispatcher
//!   listen loop logs these and keeps running (transient congestion and
//!   device resets recover on their own; a pulled cable does not, but the
//!   loop must survive it either way). Gateway I/O errors terminate only the
//!   affected operator session.
//!
//! - **`Frame`**: a malformed payload arrived on the link. Log and discard;
//!   the link remains usable for subsequent packets.
//!
//! - **`Link`**: the transport endpoint went away entirely (loopback peer
//!   dropped). Logged by the listen loop like any other link fault.
//!
//! - **`Config`**: configuration file is invalid. Fix the configuration and
//!   restart.

use thiserror::Error;

/// Errors that can occur in GroundLink
///
/// See module-level documentation for recovery strategies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame: {0}")]
    Frame(String),

    #[error("Link error: {0}")]
    Link(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
