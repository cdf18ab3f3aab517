//! # CLI Module
//!
//! The user-facing run of lastospot. [`sync`] chains the four stages and
//! narrates each boundary:
//!
//! ```text
//! AuthFlow (spotify::auth)
//!     ↓ Session
//! ChartFetcher (lastfm::chart)
//!     ↓ ScrobbleTrack*
//! TrackResolver (management::TrackResolver)
//!     ↓ ResolvedTrack*
//! PlaylistReconciler (management::PlaylistReconciler)
//! ```
//!
//! Each stage's output is the next stage's only input. [`run`] takes the
//! browser opener and the confirmation prompt as parameters so the whole
//! chain can be driven without a terminal.

mod sync;

pub use sync::{Stage, SyncOptions, SyncOutcome, run, sync};
