//! Archive module for talking to the Wayback Machine
//!
//! This module contains:
//! - The capture client and its outcome classification
//! - The capture retry state machine
//! - Snapshot lookups with retry

mod capture;
mod requester;
mod snapshot;

pub use capture::{classify_response, CaptureClient, CaptureOutcome, TransientKind, WaybackCapture};
pub use requester::{ArchiveRequester, ArchiveStatus};
pub use snapshot::{
    parse_availability, parse_timestamp, SnapshotChecker, SnapshotLookup, WaybackAvailability,
};
