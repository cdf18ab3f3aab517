//! # Last.fm Module
//!
//! Read-only access to the Last.fm 2.0 API. The only call made is
//! `user.gettoptracks` for the trailing month, see [`chart`].

pub mod chart;
