//! The track library and its filtered view.
//!
//! `Library` keeps the full ordered track list plus a *view*: the indices of
//! the tracks currently visible. The view is either every track in library
//! order or a filtered subsequence of it, so relative order is always kept.

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::LibrarySettings;
use crate::error::PlayerError;

use super::model::{DirEntry, Track};
use super::scan::list_entries;

#[derive(Debug, Clone, Default)]
pub struct Library {
    tracks: Vec<Track>,
    view: Vec<usize>,
    query: String,
    extensions: Vec<String>,
}

impl Library {
    /// Create an empty library that accepts files with the given extensions.
    pub fn new(extensions: &[String]) -> Self {
        let extensions = extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            extensions,
            ..Self::default()
        }
    }

    fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    /// Replace the library with the playable `entries`, newest first.
    ///
    /// Returns the number of visible tracks. Fails with `EmptySelection` and
    /// leaves the current library untouched when nothing is playable.
    pub fn load(&mut self, entries: Vec<DirEntry>) -> Result<usize, PlayerError> {
        let mut playable: Vec<DirEntry> = entries
            .into_iter()
            .filter(|e| self.is_audio_file(&e.path))
            .collect();

        if playable.is_empty() {
            return Err(PlayerError::EmptySelection);
        }

        // Stable sort keeps listing order for equal timestamps.
        playable.sort_by(|a, b| b.created.cmp(&a.created));

        self.tracks = playable
            .into_iter()
            .map(|e| Track::from_path(e.path))
            .collect();
        self.query.clear();
        self.reset_view();

        info!(count = self.tracks.len(), "library loaded");
        Ok(self.view.len())
    }

    /// Scan `dir` and [`Library::load`] the result.
    pub fn load_dir(&mut self, dir: &Path, settings: &LibrarySettings) -> Result<usize, PlayerError> {
        let entries = list_entries(dir, settings)?;
        self.load(entries)
    }

    /// Append a single track (e.g. a downloaded file) at the end.
    ///
    /// The track joins the view right away unless a filter is active that it
    /// does not match.
    pub fn append_remote(&mut self, track: Track) {
        let matches = self.query.is_empty() || Self::name_matches(&track.name, &self.query);
        self.tracks.push(track);
        if matches {
            self.view.push(self.tracks.len() - 1);
        }
    }

    /// Restrict the view to tracks whose name contains `term` (case-insensitive).
    ///
    /// An empty term restores the full library. When nothing matches the view
    /// becomes empty and `NoResults` is returned; the library is never changed.
    pub fn filter(&mut self, term: &str) -> Result<usize, PlayerError> {
        let term = term.trim();
        if term.is_empty() {
            self.query.clear();
            self.reset_view();
            return Ok(self.view.len());
        }

        self.query = term.to_lowercase();
        self.view = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| Self::name_matches(&t.name, &self.query))
            .map(|(i, _)| i)
            .collect();

        debug!(term, visible = self.view.len(), "filter applied");
        if self.view.is_empty() {
            return Err(PlayerError::NoResults {
                term: term.to_string(),
            });
        }
        Ok(self.view.len())
    }

    fn name_matches(name: &str, query_lower: &str) -> bool {
        name.to_lowercase().contains(query_lower)
    }

    /// Randomly permute the whole library and show all of it again.
    ///
    /// Positions into the previous view are meaningless afterwards; callers
    /// reset their index to 0.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tracks.shuffle(rng);
        self.query.clear();
        self.reset_view();
        info!(count = self.tracks.len(), "library shuffled");
    }

    fn reset_view(&mut self) {
        self.view = (0..self.tracks.len()).collect();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Track at position `index` of the current view.
    pub fn view_get(&self, index: usize) -> Option<&Track> {
        self.view.get(index).and_then(|&i| self.tracks.get(i))
    }

    pub fn view_tracks(&self) -> impl Iterator<Item = &Track> {
        self.view.iter().filter_map(|&i| self.tracks.get(i))
    }

    /// Position of the track stored at `path` in the current view.
    pub fn view_position(&self, path: &Path) -> Option<usize> {
        self.view_tracks().position(|t| t.path == path)
    }

    /// The active (lowercased) filter term; empty when unfiltered.
    pub fn query(&self) -> &str {
        &self.query
    }
}
