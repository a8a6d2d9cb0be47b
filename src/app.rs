use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui_interact::components::ListPickerState;
use ratatui_interact::state::FocusManager;
use ratatui_interact::traits::ClickRegionRegistry;
use ratatui_themes::{ThemeName, ThemePalette};

use crate::catalog::Catalogs;
use crate::select::{Arity, SearchSelect, Selection, SelectOutcome};

/// Actions that the event loop should take after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// The form is complete; exit and print the session summary.
    Accept,
}

/// Which form field currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Role,
    Level,
    Stack,
    Mode,
    Start,
}

/// Mouse hit-testing targets registered during render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    RoleInput,
    RolePanel,
    StackInput,
    StackPanel,
    StackChips,
    LevelList,
    ModeList,
    StartButton,
}

/// Column of one chip's remove glyph in the chip row, rebuilt every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipSpan {
    pub id: String,
    pub remove_col: u16,
}

/// Main application state for the session-setup form.
pub struct App {
    /// Current color theme.
    pub theme_name: ThemeName,

    /// Option catalogs the widgets draw from.
    pub catalogs: Catalogs,

    /// Focus manager for Tab navigation between fields.
    pub focus_manager: FocusManager<Field>,

    /// Single-select engine for the role picker.
    pub role_select: SearchSelect,
    /// Controlled value of the role picker.
    pub role: Selection,

    /// Multi-select engine for the tech-stack picker.
    pub stack_select: SearchSelect,
    /// Controlled value of the tech-stack picker.
    pub stack: Selection,

    /// ListPickerState for the level picker.
    pub level_state: ListPickerState,
    pub level: Option<String>,

    /// ListPickerState for the mode picker.
    pub mode_state: ListPickerState,
    pub mode: Option<String>,

    /// Click region registry for mouse hit-testing.
    pub click_regions: ClickRegionRegistry<HitTarget>,

    /// Remove-glyph columns of the rendered chips.
    pub chip_spans: Vec<ChipSpan>,

    /// Validation message for the status line.
    pub status: Option<String>,
}

fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Row index inside a bordered block, if the point falls between the borders.
fn inner_row(area: Rect, row: u16) -> Option<usize> {
    if row > area.y && row + 1 < area.y + area.height {
        Some((row - area.y - 1) as usize)
    } else {
        None
    }
}

impl App {
    pub fn new(catalogs: Catalogs) -> Self {
        Self::with_theme(catalogs, ThemeName::default())
    }

    pub fn with_theme(catalogs: Catalogs, theme_name: ThemeName) -> Self {
        let mut focus_manager = FocusManager::new();
        focus_manager.register(Field::Role);
        focus_manager.register(Field::Level);
        focus_manager.register(Field::Stack);
        focus_manager.register(Field::Mode);
        focus_manager.register(Field::Start);

        let mut level_state = ListPickerState::new(0);
        level_state.set_total(catalogs.levels.len());
        let mut mode_state = ListPickerState::new(0);
        mode_state.set_total(catalogs.modes.len());

        let mut app = Self {
            theme_name,
            catalogs,
            focus_manager,
            role_select: SearchSelect::new(Arity::Single).required(),
            role: Selection::empty(Arity::Single),
            stack_select: SearchSelect::new(Arity::Multi).required(),
            stack: Selection::empty(Arity::Multi),
            level_state,
            level: None,
            mode_state,
            mode: None,
            click_regions: ClickRegionRegistry::new(),
            chip_spans: Vec::new(),
            status: None,
        };
        app.focus_entered();
        app
    }

    /// Get the current theme palette.
    pub fn palette(&self) -> ThemePalette {
        self.theme_name.palette()
    }

    pub fn next_theme(&mut self) {
        self.theme_name = self.theme_name.next();
    }

    pub fn prev_theme(&mut self) {
        self.theme_name = self.theme_name.prev();
    }

    /// Get the currently focused field.
    pub fn focus(&self) -> Field {
        self.focus_manager
            .current()
            .copied()
            .unwrap_or(Field::Start)
    }

    /// Move focus to a specific field, dismissing any open suggestion panel.
    pub fn set_focus(&mut self, field: Field) {
        if self.focus() == field {
            return;
        }
        self.role_select.dismiss();
        self.stack_select.dismiss();
        self.focus_manager.set(field);
        self.focus_entered();
    }

    fn next_field(&mut self) {
        self.role_select.dismiss();
        self.stack_select.dismiss();
        self.focus_manager.next();
        self.focus_entered();
    }

    fn prev_field(&mut self) {
        self.role_select.dismiss();
        self.stack_select.dismiss();
        self.focus_manager.prev();
        self.focus_entered();
    }

    /// Focusing a search-select opens its panel.
    fn focus_entered(&mut self) {
        match self.focus() {
            Field::Role => self.role_select.focus_gained(),
            Field::Stack => self.stack_select.focus_gained(),
            _ => {}
        }
    }

    // --- Programmatic value setters (CLI prefill and tests) ---

    pub fn set_role(&mut self, id: &str) {
        self.role = self.role.with(id);
    }

    pub fn add_stack(&mut self, id: &str) {
        self.stack = self.stack.with(id);
    }

    pub fn set_level(&mut self, id: &str) {
        self.level = Some(id.to_string());
        if let Some(idx) = self.catalogs.levels.iter().position(|c| c.id == id) {
            self.level_state.select(idx);
        }
    }

    pub fn set_mode(&mut self, id: &str) {
        self.mode = Some(id.to_string());
        if let Some(idx) = self.catalogs.modes.iter().position(|m| m.id == id) {
            self.mode_state.select(idx);
        }
    }

    /// Required fields that still have no value.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.role.is_empty() {
            missing.push("role");
        }
        if self.level.is_none() {
            missing.push("level");
        }
        if self.stack.is_empty() {
            missing.push("tech stack");
        }
        if self.mode.is_none() {
            missing.push("mode");
        }
        missing
    }

    /// One-line description of the configured session, once complete.
    pub fn summary(&self) -> Option<String> {
        let role_id = match &self.role {
            Selection::Single(Some(id)) => id.as_str(),
            _ => return None,
        };
        let level_id = self.level.as_deref()?;
        let mode_id = self.mode.as_deref()?;
        let stacks = self.stack.ids();
        if stacks.is_empty() {
            return None;
        }

        let role = Catalogs::label_for(&self.catalogs.roles, role_id);
        let level = Catalogs::label_for(&self.catalogs.levels, level_id);
        let mode = self
            .catalogs
            .modes
            .iter()
            .find(|m| m.id == mode_id)
            .map(|m| m.label.as_str())
            .unwrap_or(mode_id);
        let stack_labels: Vec<&str> = stacks
            .into_iter()
            .map(|id| Catalogs::label_for(&self.catalogs.stacks, id))
            .collect();

        Some(format!(
            "{level} {role} · {} · {mode} mode",
            stack_labels.join(", ")
        ))
    }

    /// Validate the form; accept when complete, otherwise report what is
    /// missing on the status line.
    pub fn try_submit(&mut self) -> Action {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Action::Accept
        } else {
            self.status = Some(format!("Required: {}", missing.join(", ")));
            Action::None
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        // Ctrl+S submits from any field.
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.try_submit();
        }

        match key.code {
            KeyCode::Tab => {
                self.next_field();
                return Action::None;
            }
            KeyCode::BackTab => {
                self.prev_field();
                return Action::None;
            }
            _ => {}
        }

        match self.focus() {
            Field::Role => {
                let outcome = self
                    .role_select
                    .handle_key(key, &self.catalogs.roles, &self.role);
                self.apply_role_outcome(outcome)
            }
            Field::Stack => {
                let outcome = self
                    .stack_select
                    .handle_key(key, &self.catalogs.stacks, &self.stack);
                self.apply_stack_outcome(outcome)
            }
            Field::Level => self.handle_level_key(key),
            Field::Mode => self.handle_mode_key(key),
            Field::Start => self.handle_start_key(key),
        }
    }

    fn apply_role_outcome(&mut self, outcome: SelectOutcome) -> Action {
        if let SelectOutcome::Updated(next) = outcome {
            self.role = next;
            self.status = None;
        }
        Action::None
    }

    fn apply_stack_outcome(&mut self, outcome: SelectOutcome) -> Action {
        if let SelectOutcome::Updated(next) = outcome {
            self.stack = next;
            self.status = None;
        }
        Action::None
    }

    fn handle_level_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.level_state.select_prev();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.level_state.select_next();
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.choose_level(self.level_state.selected_index);
                Action::None
            }
            _ => self.handle_global_key(key),
        }
    }

    fn handle_mode_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.mode_state.select_prev();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode_state.select_next();
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.choose_mode(self.mode_state.selected_index);
                Action::None
            }
            _ => self.handle_global_key(key),
        }
    }

    fn handle_start_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.try_submit(),
            _ => self.handle_global_key(key),
        }
    }

    /// Shortcuts available on fields that do not capture text.
    fn handle_global_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char(']') => {
                self.next_theme();
                Action::None
            }
            KeyCode::Char('[') => {
                self.prev_theme();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn choose_level(&mut self, index: usize) {
        if let Some(choice) = self.catalogs.levels.get(index) {
            self.level = Some(choice.id.clone());
            self.level_state.select(index);
            self.status = None;
        }
    }

    fn choose_mode(&mut self, index: usize) {
        if let Some(mode) = self.catalogs.modes.get(index) {
            self.mode = Some(mode.id.clone());
            self.mode_state.select(index);
            self.status = None;
        }
    }

    /// Handle a mouse event and return the resulting Action.
    pub fn handle_mouse(&mut self, event: MouseEvent) -> Action {
        let col = event.column;
        let row = event.row;

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // Document-level dismissal runs before hit-testing: a press
                // outside an open widget closes its panel, and the press then
                // lands on whatever was under it.
                self.dismiss_outside(col, row);

                let Some(&target) = self.click_regions.handle_click(col, row) else {
                    return Action::None;
                };
                match target {
                    HitTarget::RoleInput => {
                        self.set_focus(Field::Role);
                        self.role_select.focus_gained();
                        Action::None
                    }
                    HitTarget::RolePanel => {
                        if let Some(index) = self
                            .region(HitTarget::RolePanel)
                            .and_then(|area| inner_row(area, row))
                        {
                            let outcome =
                                self.role_select
                                    .click_option(index, &self.catalogs.roles, &self.role);
                            return self.apply_role_outcome(outcome);
                        }
                        Action::None
                    }
                    HitTarget::StackInput => {
                        self.set_focus(Field::Stack);
                        self.stack_select.focus_gained();
                        Action::None
                    }
                    HitTarget::StackPanel => {
                        if let Some(index) = self
                            .region(HitTarget::StackPanel)
                            .and_then(|area| inner_row(area, row))
                        {
                            let outcome = self.stack_select.click_option(
                                index,
                                &self.catalogs.stacks,
                                &self.stack,
                            );
                            return self.apply_stack_outcome(outcome);
                        }
                        Action::None
                    }
                    HitTarget::StackChips => {
                        let removed = self
                            .chip_spans
                            .iter()
                            .find(|chip| chip.remove_col == col)
                            .map(|chip| chip.id.clone());
                        if let Some(id) = removed {
                            let outcome = self.stack_select.remove(&id, &self.stack);
                            return self.apply_stack_outcome(outcome);
                        }
                        Action::None
                    }
                    HitTarget::LevelList => {
                        self.set_focus(Field::Level);
                        if let Some(index) = self
                            .region(HitTarget::LevelList)
                            .and_then(|area| inner_row(area, row))
                        {
                            self.choose_level(index);
                        }
                        Action::None
                    }
                    HitTarget::ModeList => {
                        self.set_focus(Field::Mode);
                        if let Some(index) = self
                            .region(HitTarget::ModeList)
                            .and_then(|area| inner_row(area, row))
                        {
                            self.choose_mode(index);
                        }
                        Action::None
                    }
                    HitTarget::StartButton => {
                        self.set_focus(Field::Start);
                        self.try_submit()
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                self.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE))
            }
            MouseEventKind::ScrollDown => {
                self.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
            }
            _ => Action::None,
        }
    }

    /// Close any open suggestion panel whose widget does not contain the
    /// pressed point. The check spans the whole widget subtree: input, panel,
    /// and (for the stack picker) the chip row.
    fn dismiss_outside(&mut self, col: u16, row: u16) {
        if self.role_select.is_open()
            && !self.point_in_widget(&[HitTarget::RoleInput, HitTarget::RolePanel], col, row)
        {
            self.role_select.dismiss();
        }
        if self.stack_select.is_open()
            && !self.point_in_widget(
                &[
                    HitTarget::StackInput,
                    HitTarget::StackPanel,
                    HitTarget::StackChips,
                ],
                col,
                row,
            )
        {
            self.stack_select.dismiss();
        }
    }

    fn point_in_widget(&self, parts: &[HitTarget], col: u16, row: u16) -> bool {
        parts
            .iter()
            .any(|t| self.region(*t).is_some_and(|area| contains(area, col, row)))
    }

    /// Get the stored area for a hit target (from click regions).
    fn region(&self, target: HitTarget) -> Option<Rect> {
        self.click_regions
            .regions()
            .iter()
            .find(|r| r.data == target)
            .map(|r| r.area)
    }
}
