use std::{cell::Cell, time::Duration};

use reqwest::Client;
use tabled::Table;

use crate::{
    Res,
    config::Config,
    info,
    lastfm::chart,
    management::{
        AssumeYes, Confirm, PlaylistReconciler, ReconcileOutcome, SearchReport, TerminalPrompt,
        TrackResolver,
    },
    spotify::auth::{self, AuthOptions},
    success,
    types::{ScrobbleTableRow, ScrobbleTrack},
};

/// Stage a run is in, used to explain an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authorizing,
    FetchingChart,
    Searching,
    /// Looking for the previous playlist and waiting for the operator.
    CheckingPlaylist,
    WritingPlaylist,
    Done,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub assume_yes: bool,
    pub auth: AuthOptions,
    pub search_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed {
        report: SearchReport,
        playlist_id: String,
    },
    Declined,
}

/// Runs a full sync with the system browser and the terminal prompt.
pub async fn sync(config: &Config, options: &SyncOptions, stage: &Cell<Stage>) -> Res<SyncOutcome> {
    let http = Client::new();
    if options.assume_yes {
        run(&http, config, options, auth::open_in_browser, &mut AssumeYes, stage).await
    } else {
        run(&http, config, options, auth::open_in_browser, &mut TerminalPrompt, stage).await
    }
}

/// Authorize, fetch the chart, resolve the tracks and write the playlist.
pub async fn run<F, C>(
    http: &Client,
    config: &Config,
    options: &SyncOptions,
    open: F,
    confirm: &mut C,
    stage: &Cell<Stage>,
) -> Res<SyncOutcome>
where
    F: FnOnce(&str),
    C: Confirm,
{
    stage.set(Stage::Authorizing);
    info!("Waiting for Spotify authorization in the browser...");
    let session = auth::authorize(http, config, &options.auth, open).await?;
    success!("Authenticated as '{}'.", session.user_id);

    stage.set(Stage::FetchingChart);
    info!("Getting tracks from previous month...");
    let tracks = chart::fetch_top_tracks(http, config).await?;
    print_tracks(&tracks);

    stage.set(Stage::Searching);
    info!("Searching Spotify URIs...");
    let resolved = TrackResolver::new(http, config, &session)
        .with_delay(options.search_delay)
        .resolve(&tracks)
        .await?;
    let report = SearchReport::from_resolved(&resolved);
    info!("{} on Spotify.", report);

    stage.set(Stage::CheckingPlaylist);
    let outcome = PlaylistReconciler::new(http, config, &session)
        .reconcile(&resolved, confirm, || stage.set(Stage::WritingPlaylist))
        .await?;
    stage.set(Stage::Done);

    Ok(match outcome {
        ReconcileOutcome::Written { playlist_id, .. } => SyncOutcome::Completed {
            report,
            playlist_id,
        },
        ReconcileOutcome::Declined => SyncOutcome::Declined,
    })
}

fn print_tracks(tracks: &[ScrobbleTrack]) {
    if tracks.is_empty() {
        info!("No scrobbles found for the last month.");
        return;
    }

    info!("Tracks to be searched:");
    let rows: Vec<ScrobbleTableRow> = tracks.iter().map(ScrobbleTableRow::from).collect();
    println!("{}", Table::new(rows));
}
