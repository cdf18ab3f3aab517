use std::{collections::HashSet, future::Future};

use reqwest::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::{
    config::Config,
    info,
    spotify::{self, SpotifyError},
    success,
    types::{Playlist, ResolvedTrack, Session, resolved_uris},
    warning,
};

/// Display name marking the playlist this tool manages.
pub const MANAGED_PLAYLIST_NAME: &str = "top scrobbles for last month";

pub const MANAGED_PLAYLIST_DESCRIPTION: &str =
    "Your top lastfm scrobbles for the last month (autogenerated).";

pub const CLEAR_QUESTION: &str = "This will empty your previous playlist. Do you want to continue?";

/// Operator confirmation before a destructive step.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> impl Future<Output = bool>;
}

/// Confirms every question without asking.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    async fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

/// Asks on the terminal. Only `y` or `Y` confirms; anything else declines.
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    async fn confirm(&mut self, question: &str) -> bool {
        let mut stdout = tokio::io::stdout();
        let prompt = format!("{} [N/y] ", question);
        if stdout.write_all(prompt.as_bytes()).await.is_err() {
            return false;
        }
        let _ = stdout.flush().await;

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

/// What discovery found among the user's playlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    NoPriorPlaylist,
    PriorPlaylistFound(Playlist),
}

/// A managed playlist known to hold no tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyPlaylist {
    pub playlist: Playlist,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Written {
        playlist_id: String,
        created: bool,
        tracks_added: usize,
    },
    /// The operator refused to clear the previous playlist. Nothing was written.
    Declined,
}

/// Picks the managed playlist out of a discovery page.
///
/// The name must match exactly and the playlist must belong to `user_id`.
/// Entries without owner information are matched on name alone.
pub fn find_managed(playlists: &[Playlist], user_id: &str) -> Option<Playlist> {
    playlists
        .iter()
        .find(|p| {
            p.name == MANAGED_PLAYLIST_NAME
                && p.owner.as_ref().is_none_or(|owner| owner.id == user_id)
        })
        .cloned()
}

/// Distinct URIs in first-seen order.
///
/// A removal request deletes every occurrence of a listed URI, so each one
/// is sent once.
pub fn distinct_uris(uris: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    uris.into_iter()
        .filter(|uri| seen.insert(uri.clone()))
        .collect()
}

/// Brings the managed playlist to exactly the resolved tracks, in rank order.
///
/// NoPriorPlaylist -> create -> Empty
/// PriorPlaylistFound -> confirm -> clear -> Empty (or Declined)
/// Empty -> append -> Done
pub struct PlaylistReconciler<'a> {
    http: &'a Client,
    config: &'a Config,
    session: &'a Session,
}

impl<'a> PlaylistReconciler<'a> {
    pub fn new(http: &'a Client, config: &'a Config, session: &'a Session) -> Self {
        Self {
            http,
            config,
            session,
        }
    }

    /// Runs the whole state machine.
    ///
    /// `on_write` is called once, right before the first request that changes
    /// the user's playlists. It is not called when the operator declines.
    pub async fn reconcile<C, W>(
        &self,
        tracks: &[ResolvedTrack],
        confirm: &mut C,
        on_write: W,
    ) -> Result<ReconcileOutcome, SpotifyError>
    where
        C: Confirm,
        W: FnOnce(),
    {
        info!("Checking for previous playlist...");
        let empty = match self.discover().await? {
            Discovery::NoPriorPlaylist => {
                info!("No previous playlist found. Creating new playlist...");
                on_write();
                self.create().await?
            }
            Discovery::PriorPlaylistFound(playlist) => {
                info!("Previous playlist found.");
                warning!("This will empty your previous playlist.");
                if !confirm.confirm(CLEAR_QUESTION).await {
                    return Ok(ReconcileOutcome::Declined);
                }
                on_write();
                self.clear(playlist).await?
            }
        };

        let uris = resolved_uris(tracks);
        info!("Adding {} in-order tracks to the playlist.", uris.len());
        let playlist_id = self.fill(&empty, &uris).await?;
        success!("Playlist updated.");

        Ok(ReconcileOutcome::Written {
            playlist_id,
            created: empty.created,
            tracks_added: uris.len(),
        })
    }

    /// Looks for the managed playlist in the first page of the user's playlists.
    pub async fn discover(&self) -> Result<Discovery, SpotifyError> {
        let playlists = spotify::playlist::list(self.http, self.config, self.session).await?;
        Ok(match find_managed(&playlists, &self.session.user_id) {
            Some(playlist) => Discovery::PriorPlaylistFound(playlist),
            None => Discovery::NoPriorPlaylist,
        })
    }

    pub async fn create(&self) -> Result<EmptyPlaylist, SpotifyError> {
        let playlist = spotify::playlist::create(
            self.http,
            self.config,
            self.session,
            MANAGED_PLAYLIST_NAME,
            MANAGED_PLAYLIST_DESCRIPTION,
        )
        .await?;
        success!("Playlist '{}' created.", playlist.name);

        Ok(EmptyPlaylist {
            playlist,
            created: true,
        })
    }

    /// Removes every current item of the playlist. Duplicates are purged.
    pub async fn clear(&self, playlist: Playlist) -> Result<EmptyPlaylist, SpotifyError> {
        info!("Clearing previous playlist...");
        let current =
            spotify::playlist::track_uris(self.http, self.config, self.session, &playlist.id)
                .await?;
        let uris = distinct_uris(current);

        if !uris.is_empty() {
            spotify::playlist::remove_tracks(
                self.http,
                self.config,
                self.session,
                &playlist.id,
                &uris,
            )
            .await?;
        }
        success!("Previous playlist cleared.");

        Ok(EmptyPlaylist {
            playlist,
            created: false,
        })
    }

    /// Appends the URIs in order. No request is made for an empty list.
    pub async fn fill(&self, empty: &EmptyPlaylist, uris: &[String]) -> Result<String, SpotifyError> {
        if !uris.is_empty() {
            spotify::playlist::add_tracks(
                self.http,
                self.config,
                self.session,
                &empty.playlist.id,
                uris,
            )
            .await?;
        }
        Ok(empty.playlist.id.clone())
    }
}
