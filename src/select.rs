//! Search-select engine shared by the role picker (single-select) and the
//! tech-stack picker (multi-select).
//!
//! The engine owns only ephemeral widget state: the search buffer, the
//! open/closed flag of the suggestion panel, and the keyboard highlight
//! cursor. The selection value itself belongs to the caller; every handler
//! borrows the current value and reports a replacement through
//! [`SelectOutcome::Updated`].

use crossterm::event::{KeyCode, KeyEvent};
use ratatui_interact::components::InputState;

/// One selectable entry in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Whether a widget instance permits one or many simultaneous selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Multi,
}

/// The caller-owned selection value.
///
/// Multi keeps insertion order and never holds duplicates; removal of one
/// entry leaves the relative order of the rest untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(Option<String>),
    Multi(Vec<String>),
}

impl Selection {
    pub fn empty(arity: Arity) -> Self {
        match arity {
            Arity::Single => Selection::Single(None),
            Arity::Multi => Selection::Multi(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(id) => id.is_none(),
            Selection::Multi(ids) => ids.is_empty(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            Selection::Single(current) => current.as_deref() == Some(id),
            Selection::Multi(ids) => ids.iter().any(|i| i == id),
        }
    }

    /// Selected ids in insertion order (zero or one for single arity).
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Selection::Single(id) => id.as_deref().into_iter().collect(),
            Selection::Multi(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    /// The value after committing `id`. Single replaces; multi appends
    /// unless the id is already present.
    pub fn with(&self, id: &str) -> Selection {
        match self {
            Selection::Single(_) => Selection::Single(Some(id.to_string())),
            Selection::Multi(ids) => {
                let mut next = ids.clone();
                if !next.iter().any(|i| i == id) {
                    next.push(id.to_string());
                }
                Selection::Multi(next)
            }
        }
    }

    /// The value after removing `id`; unchanged if the id is absent.
    pub fn without(&self, id: &str) -> Selection {
        match self {
            Selection::Single(current) => {
                if current.as_deref() == Some(id) {
                    Selection::Single(None)
                } else {
                    self.clone()
                }
            }
            Selection::Multi(ids) => {
                Selection::Multi(ids.iter().filter(|i| *i != id).cloned().collect())
            }
        }
    }
}

/// Why a filtered option list came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Every catalog entry is already part of the selection.
    AllSelected,
    /// The buffer matched nothing (or the catalog itself is empty).
    NoMatch,
}

impl EmptyReason {
    /// Placeholder row text for an empty suggestion panel.
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::AllSelected => "All options already selected",
            EmptyReason::NoMatch => "No options found",
        }
    }
}

/// Case-insensitive substring filter over a catalog.
///
/// Keeps catalog order, never re-ranks, and an empty buffer matches every
/// entry. Entries whose id is in `excluded` are dropped before matching.
pub fn filter<'a>(catalog: &'a [Choice], buffer: &str, excluded: &[&str]) -> Vec<&'a Choice> {
    let needle = buffer.to_lowercase();
    catalog
        .iter()
        .filter(|choice| !excluded.contains(&choice.id.as_str()))
        .filter(|choice| choice.label.to_lowercase().contains(&needle))
        .collect()
}

/// Distinguish the two placeholder texts for an empty visible list.
pub fn empty_reason(catalog: &[Choice], excluded: &[&str]) -> EmptyReason {
    if !catalog.is_empty()
        && catalog
            .iter()
            .all(|choice| excluded.contains(&choice.id.as_str()))
    {
        EmptyReason::AllSelected
    } else {
        EmptyReason::NoMatch
    }
}

/// What the caller must do after the engine handled an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    None,
    /// The selection changed; the caller stores the new value and passes it
    /// back on the next event.
    Updated(Selection),
    /// Escape closed the panel; the caller may surrender text focus.
    Dismissed,
}

/// State machine for one search-select widget.
pub struct SearchSelect {
    arity: Arity,
    /// Search buffer with caret handling.
    pub input: InputState,
    open: bool,
    /// Highlight index into the current visible list, if any.
    cursor: Option<usize>,
    required: bool,
}

impl SearchSelect {
    pub fn new(arity: Arity) -> Self {
        Self {
            arity,
            input: InputState::empty(),
            open: false,
            cursor: None,
            required: false,
        }
    }

    /// Mark the widget as required for form validation. Rendering only; the
    /// state machine is unaffected.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn buffer(&self) -> &str {
        self.input.text()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The currently visible options for this widget. Multi arity hides
    /// entries that are already selected; single arity filters by text only.
    pub fn visible<'a>(&self, catalog: &'a [Choice], value: &Selection) -> Vec<&'a Choice> {
        filter(catalog, self.input.text(), &self.excluded(value))
    }

    /// Placeholder text choice when [`Self::visible`] is empty.
    pub fn empty_reason(&self, catalog: &[Choice], value: &Selection) -> EmptyReason {
        empty_reason(catalog, &self.excluded(value))
    }

    fn excluded<'v>(&self, value: &'v Selection) -> Vec<&'v str> {
        match self.arity {
            Arity::Multi => value.ids(),
            Arity::Single => Vec::new(),
        }
    }

    /// The input gained focus; the panel opens.
    pub fn focus_gained(&mut self) {
        self.open = true;
    }

    /// Close the panel without touching the buffer (outside pointer-down or
    /// focus moving elsewhere).
    pub fn dismiss(&mut self) {
        self.open = false;
        self.cursor = None;
    }

    /// Handle a key while this widget has focus.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        catalog: &[Choice],
        value: &Selection,
    ) -> SelectOutcome {
        match key.code {
            KeyCode::Char(c) => {
                self.input.insert_char(c);
                self.buffer_changed();
                SelectOutcome::None
            }
            KeyCode::Backspace => {
                if self.input.text().is_empty() {
                    // Empty buffer: strip the newest selected entry instead.
                    if self.arity == Arity::Multi {
                        if let Some(last) = value.ids().last().map(|id| id.to_string()) {
                            return self.remove(&last, value);
                        }
                    }
                    SelectOutcome::None
                } else {
                    self.input.delete_char_backward();
                    self.buffer_changed();
                    SelectOutcome::None
                }
            }
            KeyCode::Delete => {
                if !self.input.text().is_empty() {
                    self.input.delete_char_forward();
                    self.buffer_changed();
                }
                SelectOutcome::None
            }
            KeyCode::Left => {
                self.input.move_left();
                SelectOutcome::None
            }
            KeyCode::Right => {
                self.input.move_right();
                SelectOutcome::None
            }
            KeyCode::Home => {
                self.input.move_home();
                SelectOutcome::None
            }
            KeyCode::End => {
                self.input.move_end();
                SelectOutcome::None
            }
            KeyCode::Down => {
                // Browsing reopens a closed panel.
                self.open = true;
                let len = self.visible(catalog, value).len();
                self.cursor = match self.cursor {
                    None if len > 0 => Some(0),
                    None => None,
                    Some(_) if len == 0 => None,
                    Some(i) => Some((i + 1).min(len - 1)),
                };
                SelectOutcome::None
            }
            KeyCode::Up => {
                self.cursor = match self.cursor {
                    Some(i) if i > 0 => Some(i - 1),
                    _ => None,
                };
                SelectOutcome::None
            }
            KeyCode::Enter => {
                if let Some(i) = self.cursor {
                    let committed = self
                        .visible(catalog, value)
                        .get(i)
                        .map(|choice| choice.id.clone());
                    if let Some(id) = committed {
                        return self.commit(&id, value);
                    }
                }
                SelectOutcome::None
            }
            KeyCode::Esc => {
                self.open = false;
                self.cursor = None;
                SelectOutcome::Dismissed
            }
            _ => SelectOutcome::None,
        }
    }

    /// A pointer press on the visible option row at `index`. Presses on the
    /// placeholder row fall outside the visible list and are ignored.
    pub fn click_option(
        &mut self,
        index: usize,
        catalog: &[Choice],
        value: &Selection,
    ) -> SelectOutcome {
        let clicked = self
            .visible(catalog, value)
            .get(index)
            .map(|choice| choice.id.clone());
        match clicked {
            Some(id) => self.commit(&id, value),
            None => SelectOutcome::None,
        }
    }

    /// Remove one selected id (chip remove control, or clearing a single
    /// selection). No-op when the id is not selected.
    pub fn remove(&mut self, id: &str, value: &Selection) -> SelectOutcome {
        if !value.contains(id) {
            return SelectOutcome::None;
        }
        // The removed id becomes a candidate again, so the highlight is stale.
        self.cursor = None;
        SelectOutcome::Updated(value.without(id))
    }

    fn commit(&mut self, id: &str, value: &Selection) -> SelectOutcome {
        let next = value.with(id);
        self.input.clear();
        self.open = false;
        self.cursor = None;
        SelectOutcome::Updated(next)
    }

    fn buffer_changed(&mut self) {
        self.open = true;
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn catalog() -> Vec<Choice> {
        vec![
            Choice::new("react", "React"),
            Choice::new("vue", "Vue"),
            Choice::new("node", "Node.js"),
            Choice::new("go", "Go"),
            Choice::new("rust", "Rust"),
        ]
    }

    fn type_str(select: &mut SearchSelect, catalog: &[Choice], value: &Selection, text: &str) {
        for c in text.chars() {
            select.handle_key(key(KeyCode::Char(c)), catalog, value);
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let catalog = catalog();
        let hits = filter(&catalog, "RE", &[]);
        let labels: Vec<&str> = hits.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["React"]);

        let hits = filter(&catalog, "o", &[]);
        let labels: Vec<&str> = hits.iter().map(|c| c.label.as_str()).collect();
        // Catalog order preserved, no re-ranking.
        assert_eq!(labels, vec!["Node.js", "Go"]);
    }

    #[test]
    fn filter_empty_buffer_matches_everything() {
        let catalog = catalog();
        assert_eq!(filter(&catalog, "", &[]).len(), catalog.len());
    }

    #[test]
    fn filter_drops_excluded_ids() {
        let catalog = catalog();
        let hits = filter(&catalog, "", &["react", "go"]);
        let ids: Vec<&str> = hits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["vue", "node", "rust"]);
    }

    #[test]
    fn empty_reason_distinguishes_exhaustion_from_no_match() {
        let catalog = vec![Choice::new("a", "Alpha"), Choice::new("b", "Beta")];
        assert_eq!(empty_reason(&catalog, &["a", "b"]), EmptyReason::AllSelected);
        assert_eq!(empty_reason(&catalog, &["a"]), EmptyReason::NoMatch);
        assert_eq!(empty_reason(&[], &[]), EmptyReason::NoMatch);
        assert_eq!(EmptyReason::AllSelected.message(), "All options already selected");
        assert_eq!(EmptyReason::NoMatch.message(), "No options found");
    }

    #[test]
    fn multi_visible_never_shows_selected_ids() {
        let catalog = catalog();
        let select = SearchSelect::new(Arity::Multi);
        let value = Selection::Multi(vec!["react".into(), "rust".into()]);
        let visible = select.visible(&catalog, &value);
        assert!(visible.iter().all(|c| !value.contains(&c.id)));
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn single_visible_keeps_the_selected_option() {
        let catalog = catalog();
        let select = SearchSelect::new(Arity::Single);
        let value = Selection::Single(Some("go".into()));
        let visible = select.visible(&catalog, &value);
        assert_eq!(visible.len(), catalog.len());
    }

    #[test]
    fn typing_opens_the_panel_and_resets_the_cursor() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert_eq!(select.cursor(), Some(0));

        select.handle_key(key(KeyCode::Char('r')), &catalog, &value);
        assert!(select.is_open());
        assert_eq!(select.cursor(), None);
        assert_eq!(select.buffer(), "r");
    }

    #[test]
    fn arrow_down_clamps_at_the_last_visible_option() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        for _ in 0..10 {
            select.handle_key(key(KeyCode::Down), &catalog, &value);
        }
        assert_eq!(select.cursor(), Some(catalog.len() - 1));
    }

    #[test]
    fn arrow_up_walks_back_to_none_and_stays_there() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        select.handle_key(key(KeyCode::Down), &catalog, &value);
        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert_eq!(select.cursor(), Some(1));

        select.handle_key(key(KeyCode::Up), &catalog, &value);
        assert_eq!(select.cursor(), Some(0));
        select.handle_key(key(KeyCode::Up), &catalog, &value);
        assert_eq!(select.cursor(), None);
        select.handle_key(key(KeyCode::Up), &catalog, &value);
        assert_eq!(select.cursor(), None);
    }

    #[test]
    fn arrow_down_reopens_a_dismissed_panel() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        select.focus_gained();
        select.dismiss();
        assert!(!select.is_open());

        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert!(select.is_open());
        assert_eq!(select.cursor(), Some(0));
    }

    #[test]
    fn arrow_down_on_an_empty_visible_list_leaves_no_cursor() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "zzz");
        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert!(select.is_open());
        assert_eq!(select.cursor(), None);
    }

    #[test]
    fn enter_commits_the_highlighted_option() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "ru");
        select.handle_key(key(KeyCode::Down), &catalog, &value);
        let outcome = select.handle_key(key(KeyCode::Enter), &catalog, &value);

        assert_eq!(
            outcome,
            SelectOutcome::Updated(Selection::Single(Some("rust".into())))
        );
        assert_eq!(select.buffer(), "");
        assert!(!select.is_open());
        assert_eq!(select.cursor(), None);
    }

    #[test]
    fn enter_without_a_cursor_is_a_no_op() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "ru");
        let outcome = select.handle_key(key(KeyCode::Enter), &catalog, &value);
        assert_eq!(outcome, SelectOutcome::None);
        assert_eq!(select.buffer(), "ru");
    }

    #[test]
    fn single_commit_replaces_the_previous_choice() {
        let catalog = catalog();
        let value = Selection::Single(Some("go".into()));
        let mut select = SearchSelect::new(Arity::Single);

        let outcome = select.click_option(0, &catalog, &value);
        assert_eq!(
            outcome,
            SelectOutcome::Updated(Selection::Single(Some("react".into())))
        );
    }

    #[test]
    fn multi_commit_appends_in_insertion_order() {
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Multi);
        let mut value = Selection::empty(Arity::Multi);

        for wanted in ["rust", "go"] {
            let index = select
                .visible(&catalog, &value)
                .iter()
                .position(|c| c.id == wanted)
                .unwrap();
            if let SelectOutcome::Updated(next) = select.click_option(index, &catalog, &value) {
                value = next;
            }
        }
        assert_eq!(value, Selection::Multi(vec!["rust".into(), "go".into()]));
    }

    #[test]
    fn committing_a_duplicate_leaves_the_value_unchanged() {
        let value = Selection::Multi(vec!["react".into(), "vue".into()]);
        assert_eq!(value.with("react"), value);
        // The widget-level side effects still apply on a redundant commit.
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Single);
        let single = Selection::Single(Some("react".into()));
        select.focus_gained();
        let outcome = select.click_option(0, &catalog, &single);
        assert_eq!(outcome, SelectOutcome::Updated(single));
        assert!(!select.is_open());
    }

    #[test]
    fn removing_an_interior_id_preserves_order() {
        let value = Selection::Multi(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(
            value.without("b"),
            Selection::Multi(vec!["a".into(), "c".into()])
        );
    }

    #[test]
    fn backspace_on_empty_buffer_removes_the_newest_entry() {
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Multi);
        let value = Selection::Multi(vec!["react".into(), "vue".into(), "go".into()]);

        let outcome = select.handle_key(key(KeyCode::Backspace), &catalog, &value);
        assert_eq!(
            outcome,
            SelectOutcome::Updated(Selection::Multi(vec!["react".into(), "vue".into()]))
        );
    }

    #[test]
    fn backspace_with_text_edits_the_buffer_instead() {
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Multi);
        let value = Selection::Multi(vec!["react".into()]);

        type_str(&mut select, &catalog, &value, "go");
        let outcome = select.handle_key(key(KeyCode::Backspace), &catalog, &value);
        assert_eq!(outcome, SelectOutcome::None);
        assert_eq!(select.buffer(), "g");
    }

    #[test]
    fn backspace_on_an_empty_selection_is_a_no_op() {
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Multi);
        let value = Selection::empty(Arity::Multi);

        let outcome = select.handle_key(key(KeyCode::Backspace), &catalog, &value);
        assert_eq!(outcome, SelectOutcome::None);
    }

    #[test]
    fn remove_of_an_unselected_id_is_a_no_op() {
        let mut select = SearchSelect::new(Arity::Multi);
        let value = Selection::Multi(vec!["react".into()]);
        assert_eq!(select.remove("go", &value), SelectOutcome::None);
    }

    #[test]
    fn removal_resets_the_highlight_cursor() {
        let catalog = catalog();
        let mut select = SearchSelect::new(Arity::Multi);
        let value = Selection::Multi(vec!["react".into()]);

        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert!(select.cursor().is_some());

        select.remove("react", &value);
        assert_eq!(select.cursor(), None);
    }

    #[test]
    fn escape_dismisses_but_keeps_the_buffer() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "abc");
        let outcome = select.handle_key(key(KeyCode::Esc), &catalog, &value);
        assert_eq!(outcome, SelectOutcome::Dismissed);
        assert!(!select.is_open());
        assert_eq!(select.buffer(), "abc");
    }

    #[test]
    fn outside_dismiss_keeps_the_buffer() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "abc");
        assert!(select.is_open());
        select.dismiss();
        assert!(!select.is_open());
        assert_eq!(select.buffer(), "abc");
    }

    #[test]
    fn click_past_the_visible_list_is_ignored() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "zzz");
        // Only the placeholder row is rendered; index 0 hits nothing.
        assert_eq!(select.click_option(0, &catalog, &value), SelectOutcome::None);
    }

    #[test]
    fn caret_movement_does_not_touch_the_cursor() {
        let catalog = catalog();
        let value = Selection::empty(Arity::Single);
        let mut select = SearchSelect::new(Arity::Single);

        type_str(&mut select, &catalog, &value, "o");
        select.handle_key(key(KeyCode::Down), &catalog, &value);
        assert_eq!(select.cursor(), Some(0));

        select.handle_key(key(KeyCode::Left), &catalog, &value);
        select.handle_key(key(KeyCode::Home), &catalog, &value);
        select.handle_key(key(KeyCode::End), &catalog, &value);
        assert_eq!(select.cursor(), Some(0));
    }
}
