// Article list state management.
// Holds the loaded feed, selection, and the single expanded article.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::loader::{Feed, LoadOutcome, LoadSummary};
use crate::nostr::Post;

/// Display name used when an author has no usable profile.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// The id of the one expanded article, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState(Option<String>);

impl ExpansionState {
    pub fn expanded(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_expanded(&self, post_id: &str) -> bool {
        self.0.as_deref() == Some(post_id)
    }

    /// Collapse `post_id` if it is expanded, otherwise make it the expanded one.
    pub fn toggle(&mut self, post_id: &str) {
        if self.is_expanded(post_id) {
            self.0 = None;
        } else {
            self.0 = Some(post_id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// One displayable row, derived from an article and its author's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub id: String,
    pub name: String,
    pub picture: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Markdown content, present only for the expanded article.
    pub content: Option<String>,
}

impl PostEntry {
    pub fn is_expanded(&self) -> bool {
        self.content.is_some()
    }
}

/// Complete state for the article list.
#[derive(Debug)]
pub struct PostListState {
    pub feed: Feed,
    pub expansion: ExpansionState,
    pub list_state: ListState,
    /// True until the initial load sequence has finished.
    pub loading: bool,
    pub summary: Option<LoadSummary>,
    /// Vertical scroll of the reader pane.
    pub reader_scroll: u16,
    placeholder_avatar: String,
}

impl PostListState {
    pub fn new(placeholder_avatar: impl Into<String>) -> Self {
        Self {
            feed: Feed::default(),
            expansion: ExpansionState::default(),
            list_state: ListState::default(),
            loading: true,
            summary: None,
            reader_scroll: 0,
            placeholder_avatar: placeholder_avatar.into(),
        }
    }

    /// Store the result of a finished load sequence.
    pub fn apply_load(&mut self, outcome: LoadOutcome) {
        self.feed = outcome.feed;
        self.summary = Some(outcome.summary);
        self.loading = false;
        self.reset_selection();
    }

    /// Posts that are displayed, in feed order.
    pub fn articles(&self) -> impl Iterator<Item = &Post> {
        self.feed.posts.iter().filter(|post| post.is_article())
    }

    pub fn article_count(&self) -> usize {
        self.articles().count()
    }

    /// Build display entries for all articles.
    pub fn entries(&self) -> Vec<PostEntry> {
        self.articles().map(|post| self.entry_for(post)).collect()
    }

    /// The entry for the expanded article, if it is still in the feed.
    pub fn expanded_entry(&self) -> Option<PostEntry> {
        let id = self.expansion.expanded()?;
        self.articles()
            .find(|post| post.id == id)
            .map(|post| self.entry_for(post))
    }

    fn entry_for(&self, post: &Post) -> PostEntry {
        let metadata = self
            .feed
            .profiles
            .get(&post.pubkey)
            .map(Post::metadata)
            .unwrap_or_default();

        PostEntry {
            id: post.id.clone(),
            name: metadata.display_name().unwrap_or(UNKNOWN_AUTHOR).to_string(),
            picture: metadata
                .picture_url()
                .unwrap_or(self.placeholder_avatar.as_str())
                .to_string(),
            title: post.title().map(str::to_string),
            summary: post.summary().map(str::to_string),
            published_at: post.published_at(),
            content: self
                .expansion
                .is_expanded(&post.id)
                .then(|| post.content.clone()),
        }
    }

    pub fn toggle_expand(&mut self, post_id: &str) {
        self.expansion.toggle(post_id);
        self.reader_scroll = 0;
    }

    /// Toggle expansion of the selected article.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id().map(str::to_string) {
            self.toggle_expand(&id);
        }
    }

    /// Id of the selected article.
    pub fn selected_id(&self) -> Option<&str> {
        let index = self.list_state.selected()?;
        self.articles().nth(index).map(|post| post.id.as_str())
    }

    /// Select the next article in the list.
    pub fn select_next(&mut self) {
        let len = self.article_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous article in the list.
    pub fn select_prev(&mut self) {
        if self.article_count() == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.article_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.article_count();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Reset selection to first article.
    pub fn reset_selection(&mut self) {
        if self.article_count() > 0 {
            self.list_state.select(Some(0));
        } else {
            self.list_state.select(None);
        }
    }

    pub fn scroll_reader_down(&mut self, lines: u16) {
        self.reader_scroll = self.reader_scroll.saturating_add(lines);
    }

    pub fn scroll_reader_up(&mut self, lines: u16) {
        self.reader_scroll = self.reader_scroll.saturating_sub(lines);
    }
}
