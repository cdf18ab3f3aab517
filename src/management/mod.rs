mod playlist;
mod tracks;

pub use playlist::{
    AssumeYes, CLEAR_QUESTION, Confirm, Discovery, EmptyPlaylist, MANAGED_PLAYLIST_DESCRIPTION,
    MANAGED_PLAYLIST_NAME, PlaylistReconciler, ReconcileOutcome, TerminalPrompt, distinct_uris,
    find_managed, is_yes,
};
pub use tracks::{DEFAULT_SEARCH_DELAY, SearchReport, TrackResolver};
