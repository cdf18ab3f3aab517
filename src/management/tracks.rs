use std::{fmt, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::time::sleep;

use crate::{
    config::Config,
    spotify::{self, SpotifyError},
    types::{ResolvedTrack, ScrobbleTrack, Session},
};

/// Pause between two consecutive search requests.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(200);

/// Found versus searched tracks of one resolver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub found: usize,
    pub total: usize,
}

impl SearchReport {
    pub fn from_resolved(tracks: &[ResolvedTrack]) -> Self {
        Self {
            found: tracks.iter().filter(|t| t.uri.is_some()).count(),
            total: tracks.len(),
        }
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} tracks found", self.found, self.total)
    }
}

/// Maps scrobbled tracks to Spotify URIs, one search at a time.
///
/// Searches are strictly sequential with a fixed pause in between. A track
/// the search does not find is kept with an empty URI. A failed search (an
/// error status, a malformed body or an exhausted rate limit) stops the
/// resolution and is returned to the caller.
pub struct TrackResolver<'a> {
    http: &'a Client,
    config: &'a Config,
    session: &'a Session,
    delay: Duration,
}

impl<'a> TrackResolver<'a> {
    pub fn new(http: &'a Client, config: &'a Config, session: &'a Session) -> Self {
        Self {
            http,
            config,
            session,
            delay: DEFAULT_SEARCH_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Resolves every track in input order. The output has the input's length.
    pub async fn resolve(
        &self,
        tracks: &[ScrobbleTrack],
    ) -> Result<Vec<ResolvedTrack>, SpotifyError> {
        let pb = ProgressBar::new(tracks.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("=> "),
        );

        let mut resolved = Vec::with_capacity(tracks.len());
        for (i, track) in tracks.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            pb.set_message(track.name.clone());

            let found = spotify::search::search_track(
                self.http,
                self.config,
                self.session,
                &track.search_query(),
            )
            .await;

            let uri = match found {
                Ok(Some(uri)) => {
                    pb.println(format!("    {} --- {}: {}", track.rank, track.name, uri));
                    Some(uri)
                }
                Ok(None) => {
                    pb.println(format!("    {} --- {}: not found", track.rank, track.name));
                    None
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            };

            resolved.push(ResolvedTrack {
                source: track.clone(),
                uri,
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(resolved)
    }
}
