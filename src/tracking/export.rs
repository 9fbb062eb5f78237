//! A user's notes as one ordered document.
//!
//! Shows and movies are walked in display order (nulls last). A node appears
//! only if it, or something below it, carries a non-blank note from the user.
//! Headings never skip a level: an episode note always brings its season and
//! show headings along, even when those have no note of their own.

use super::error::TrackingResult;
use crate::catalog_store::{sort_top_level, CatalogStore, ContentRef, Movie, Show, TopLevel};
use crate::user::{FullUserStore, Note};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotesExport {
    pub user: String,
    pub entries: Vec<ExportEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExportEntry {
    Show(ShowNotes),
    Movie(MovieNotes),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowNotes {
    pub id: i64,
    pub title: String,
    pub note: Option<String>,
    pub seasons: Vec<SeasonNotes>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonNotes {
    pub id: i64,
    pub number: i32,
    pub note: Option<String>,
    pub episodes: Vec<EpisodeNotes>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeNotes {
    pub id: i64,
    pub number: Option<i32>,
    pub title: String,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieNotes {
    pub id: i64,
    pub title: String,
    pub note: String,
}

/// Subtrees to export. A selected show or season brings every note below it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ExportSelection {
    pub selected: Vec<ContentRef>,
    /// Include notes written by every user, not just the caller.
    #[serde(default)]
    pub include_others: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectedNote {
    pub id: i64,
    pub user: String,
    pub target: ContentRef,
    pub title: String,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NotedProgress {
    pub noted: usize,
    pub total: usize,
}

/// One selectable show or movie that carries notes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportSummaryItem {
    pub target: ContentRef,
    pub title: String,
    /// Notes on the node and on everything below it.
    pub note_count: usize,
    /// Episodes with at least one note, out of all the show's episodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<NotedProgress>,
}

type NotesByTarget = HashMap<ContentRef, Vec<Note>>;

pub struct ExportSerializer {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
}

impl ExportSerializer {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn FullUserStore>) -> Self {
        Self { catalog, users }
    }

    pub fn export(&self, user_id: i64, user_handle: &str) -> TrackingResult<NotesExport> {
        let mut notes: HashMap<ContentRef, String> = self
            .users
            .get_user_notes(user_id)?
            .into_iter()
            .filter(|note| note.has_text())
            .map(|note| (note.target, note.content.trim().to_string()))
            .collect();

        let mut entries = Vec::new();
        for item in self.top_level()? {
            match item {
                TopLevel::Show(show) => {
                    let mut seasons = Vec::new();
                    for season in self.catalog.get_show_seasons(show.id)? {
                        let episodes: Vec<EpisodeNotes> = self
                            .catalog
                            .get_season_episodes(season.id)?
                            .into_iter()
                            .filter_map(|episode| {
                                notes.remove(&ContentRef::Episode(episode.id)).map(|note| {
                                    EpisodeNotes {
                                        id: episode.id,
                                        number: episode.episode_number,
                                        title: episode.title,
                                        note,
                                    }
                                })
                            })
                            .collect();
                        let note = notes.remove(&ContentRef::Season(season.id));
                        if note.is_some() || !episodes.is_empty() {
                            seasons.push(SeasonNotes {
                                id: season.id,
                                number: season.number,
                                note,
                                episodes,
                            });
                        }
                    }
                    let note = notes.remove(&ContentRef::Show(show.id));
                    if note.is_some() || !seasons.is_empty() {
                        entries.push(ExportEntry::Show(ShowNotes {
                            id: show.id,
                            title: show.title,
                            note,
                            seasons,
                        }));
                    }
                }
                TopLevel::Movie(movie) => {
                    if let Some(note) = notes.remove(&ContentRef::Movie(movie.id)) {
                        entries.push(ExportEntry::Movie(MovieNotes {
                            id: movie.id,
                            title: movie.title,
                            note,
                        }));
                    }
                }
            }
        }

        Ok(NotesExport {
            user: user_handle.to_string(),
            entries,
        })
    }

    /// Non-blank notes grouped by node, oldest first within a node.
    fn notes_by_target(&self, user_id: i64, include_others: bool) -> TrackingResult<NotesByTarget> {
        let notes = if include_others {
            self.users.get_all_notes(None)?
        } else {
            self.users.get_user_notes(user_id)?
        };
        let mut by_target: NotesByTarget = HashMap::new();
        for note in notes.into_iter().filter(|n| n.has_text()) {
            by_target.entry(note.target).or_default().push(note);
        }
        for notes in by_target.values_mut() {
            notes.sort_by_key(|n| (n.timestamp, n.id));
        }
        Ok(by_target)
    }

    fn top_level(&self) -> TrackingResult<Vec<TopLevel<Show, Movie>>> {
        let shows = self
            .catalog
            .list_shows()?
            .into_iter()
            .map(|s| (s.order_key(), s.id, s))
            .collect();
        let movies = self
            .catalog
            .list_movies()?
            .into_iter()
            .map(|m| (m.order_key(), m.id, m))
            .collect();
        Ok(sort_top_level(shows, movies))
    }

    /// Notes inside the selected subtrees as a flat list in content order:
    /// a show's own notes, then per season its notes and its episodes' notes.
    pub fn export_selected(
        &self,
        user_id: i64,
        selection: &ExportSelection,
    ) -> TrackingResult<Vec<SelectedNote>> {
        if selection.selected.is_empty() {
            return Ok(Vec::new());
        }
        let selected: HashSet<ContentRef> = selection.selected.iter().copied().collect();
        let mut notes = self.notes_by_target(user_id, selection.include_others)?;
        let mut handles: HashMap<i64, String> = HashMap::new();
        let mut picked: Vec<(String, Note)> = Vec::new();

        for item in self.top_level()? {
            match item {
                TopLevel::Show(show) => {
                    let show_selected = selected.contains(&ContentRef::Show(show.id));
                    if show_selected {
                        for note in notes.remove(&ContentRef::Show(show.id)).unwrap_or_default() {
                            picked.push((show.title.clone(), note));
                        }
                    }
                    for season in self.catalog.get_show_seasons(show.id)? {
                        let season_selected =
                            show_selected || selected.contains(&ContentRef::Season(season.id));
                        let season_title = format!("{} S{}", show.title, season.number);
                        if season_selected {
                            for note in notes
                                .remove(&ContentRef::Season(season.id))
                                .unwrap_or_default()
                            {
                                picked.push((season_title.clone(), note));
                            }
                        }
                        for episode in self.catalog.get_season_episodes(season.id)? {
                            let target = ContentRef::Episode(episode.id);
                            if !season_selected && !selected.contains(&target) {
                                continue;
                            }
                            for note in notes.remove(&target).unwrap_or_default() {
                                picked.push((
                                    format!("{}: {}", season_title, episode.title),
                                    note,
                                ));
                            }
                        }
                    }
                }
                TopLevel::Movie(movie) => {
                    let target = ContentRef::Movie(movie.id);
                    if selected.contains(&target) {
                        for note in notes.remove(&target).unwrap_or_default() {
                            picked.push((movie.title.clone(), note));
                        }
                    }
                }
            }
        }

        let mut out = Vec::with_capacity(picked.len());
        for (title, note) in picked {
            let user = match handles.get(&note.user_id) {
                Some(handle) => handle.clone(),
                None => {
                    let handle = self
                        .users
                        .get_user_handle(note.user_id)?
                        .unwrap_or_default();
                    handles.insert(note.user_id, handle.clone());
                    handle
                }
            };
            out.push(SelectedNote {
                id: note.id,
                user,
                target: note.target,
                title,
                content: note.content.trim().to_string(),
                timestamp: note.timestamp,
            });
        }
        Ok(out)
    }

    /// Shows and movies carrying notes, in display order, with note counts
    /// and episode progress for shows.
    pub fn summary(&self, user_id: i64, include_others: bool) -> TrackingResult<Vec<ExportSummaryItem>> {
        let notes = self.notes_by_target(user_id, include_others)?;
        let count = |target: ContentRef| notes.get(&target).map_or(0, Vec::len);

        let mut items = Vec::new();
        for item in self.top_level()? {
            match item {
                TopLevel::Show(show) => {
                    let mut note_count = count(ContentRef::Show(show.id));
                    let mut noted = 0;
                    let mut total = 0;
                    for season in self.catalog.get_show_seasons(show.id)? {
                        note_count += count(ContentRef::Season(season.id));
                        for episode in self.catalog.get_season_episodes(season.id)? {
                            let on_episode = count(ContentRef::Episode(episode.id));
                            total += 1;
                            if on_episode > 0 {
                                noted += 1;
                                note_count += on_episode;
                            }
                        }
                    }
                    if note_count > 0 {
                        items.push(ExportSummaryItem {
                            target: ContentRef::Show(show.id),
                            title: show.title,
                            note_count,
                            episodes: Some(NotedProgress { noted, total }),
                        });
                    }
                }
                TopLevel::Movie(movie) => {
                    let note_count = count(ContentRef::Movie(movie.id));
                    if note_count > 0 {
                        items.push(ExportSummaryItem {
                            target: ContentRef::Movie(movie.id),
                            title: movie.title,
                            note_count,
                            episodes: None,
                        });
                    }
                }
            }
        }
        Ok(items)
    }
}

fn push_section(out: &mut String, heading: &str, note: Option<&str>) {
    let _ = writeln!(out, "{}", heading);
    let _ = writeln!(out);
    if let Some(note) = note {
        let _ = writeln!(out, "{}", note);
        let _ = writeln!(out);
    }
}

/// `#` for shows and movies, `##` for seasons, `###` for episodes.
pub fn render_markdown(export: &NotesExport) -> String {
    let mut out = String::new();
    for entry in &export.entries {
        match entry {
            ExportEntry::Show(show) => {
                push_section(&mut out, &format!("# {}", show.title), show.note.as_deref());
                for season in &show.seasons {
                    push_section(
                        &mut out,
                        &format!("## Season {}", season.number),
                        season.note.as_deref(),
                    );
                    for episode in &season.episodes {
                        let heading = match episode.number {
                            Some(number) => format!("### Episode {}: {}", number, episode.title),
                            None => format!("### {}", episode.title),
                        };
                        push_section(&mut out, &heading, Some(&episode.note));
                    }
                }
            }
            ExportEntry::Movie(movie) => {
                push_section(&mut out, &format!("# {}", movie.title), Some(&movie.note));
            }
        }
    }
    out
}
