use std::fmt::Display;
use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::info;

use crate::chooser::{parse_custom_range, ChoiceMethod, ChoiceRequest, Chooser};
use crate::db::{
    add_item_to_list, create_item, create_item_list, delete_all_item_lists, delete_all_items,
    delete_item, delete_item_list, fetch_item_lists, fetch_items, fetch_items_for_list,
    remove_item_from_list, rename_item, rename_item_list, seed_default_item_lists,
    seed_default_items,
};
use crate::error::ChooserError;
use crate::models::{Item, ItemList};
use crate::settings::AppSettings;

use super::forms::{DeleteTarget, TextForm};
use super::helpers::{centered_rect, cycle_selection, radio_line, surface_error};
use super::screens::{AddMembersState, MembersScreen, Picker};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE: isize = 5;

/// High-level navigation states.
enum Screen {
    Chooser,
    Items(Picker<Item>),
    Lists(Picker<ItemList>),
    Members(MembersScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingItem(TextForm),
    RenamingItem { id: i64, form: TextForm },
    AddingList(TextForm),
    RenamingList { id: i64, form: TextForm },
    EditingRange(TextForm),
    ConfirmDelete(DeleteTarget),
    AddingMembers(AddMembersState),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    settings: AppSettings,
    chooser: Chooser,
    lists: Vec<ItemList>,
    list_index: usize,
    result: Option<String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, settings: AppSettings) -> Result<Self> {
        let mut chooser = Chooser::new();
        chooser.set_last_custom_range(settings.custom_dice_range);

        let mut app = Self {
            conn,
            settings,
            chooser,
            lists: Vec::new(),
            list_index: 0,
            result: None,
            screen: Screen::Chooser,
            mode: Mode::Normal,
            status: None,
        };
        app.reload_lists()?;
        Ok(app)
    }

    /// Remember the selected list and write all settings back.
    pub fn shutdown(&mut self) -> Result<()> {
        self.settings.default_list_name = self.current_list().map(|list| list.list_name.clone());
        self.settings
            .persist(&self.conn)
            .context("failed to save settings")?;
        info!("session closed");
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingItem(form) => self
                .drive_form(code, form, "Add item cancelled.", Self::save_new_item)
                .map_or(Mode::Normal, Mode::AddingItem),
            Mode::RenamingItem { id, form } => self
                .drive_form(code, form, "Rename cancelled.", |app, form| {
                    app.save_item_rename(id, form)
                })
                .map_or(Mode::Normal, |form| Mode::RenamingItem { id, form }),
            Mode::AddingList(form) => self
                .drive_form(code, form, "Add list cancelled.", Self::save_new_list)
                .map_or(Mode::Normal, Mode::AddingList),
            Mode::RenamingList { id, form } => self
                .drive_form(code, form, "Rename cancelled.", |app, form| {
                    app.save_list_rename(id, form)
                })
                .map_or(Mode::Normal, |form| Mode::RenamingList { id, form }),
            Mode::EditingRange(form) => self
                .drive_form(code, form, "Range unchanged.", Self::apply_range)
                .map_or(Mode::Normal, Mode::EditingRange),
            Mode::ConfirmDelete(target) => self.handle_confirm_delete(code, target)?,
            Mode::AddingMembers(state) => self.handle_add_members(code, state)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Chooser => self.handle_chooser_key(code, exit),
            Screen::Items(_) => self.handle_items_key(code, exit),
            Screen::Lists(_) => self.handle_lists_key(code, exit),
            Screen::Members(_) => self.handle_members_key(code, exit),
        }
    }

    fn handle_chooser_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Char(ch @ '1'..='4') => {
                let index = ch as usize - '1' as usize;
                self.select_method(ChoiceMethod::ALL[index]);
            }
            KeyCode::Left => self.select_method(self.settings.choice_method.cycle(-1)),
            KeyCode::Right => self.select_method(self.settings.choice_method.cycle(1)),
            KeyCode::Up => self.select_list(-1),
            KeyCode::Down => self.select_list(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.choose(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return Ok(Mode::EditingRange(TextForm::numeric(
                    self.settings.custom_dice_range,
                )));
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                self.open_items(None)?;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.clear_status();
                self.open_lists(None)?;
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_items_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Items(picker) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                self.clear_status();
                self.open_chooser()?;
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-PAGE),
            KeyCode::PageDown => picker.move_selection(PAGE),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingItem(TextForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(item) = picker.current().cloned() {
                    self.clear_status();
                    return Ok(Mode::RenamingItem {
                        id: item.id,
                        form: TextForm::with_value(item.name),
                    });
                }
                self.set_status("No item selected to rename.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some(item) = picker.current().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(DeleteTarget::Item(item)));
                }
                self.set_status("No item selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('D') => {
                if !picker.rows.is_empty() {
                    return Ok(Mode::ConfirmDelete(DeleteTarget::AllItems));
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.seed_items()?,
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_lists_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Lists(picker) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                self.clear_status();
                self.open_chooser()?;
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-PAGE),
            KeyCode::PageDown => picker.move_selection(PAGE),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                if let Some(list) = picker.current().cloned() {
                    self.clear_status();
                    self.open_members(list)?;
                }
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingList(TextForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(list) = picker.current().cloned() {
                    self.clear_status();
                    return Ok(Mode::RenamingList {
                        id: list.id,
                        form: TextForm::with_value(list.list_name),
                    });
                }
                self.set_status("No list selected to rename.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some(list) = picker.current().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(DeleteTarget::List(list)));
                }
                self.set_status("No list selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('D') => {
                if !picker.rows.is_empty() {
                    return Ok(Mode::ConfirmDelete(DeleteTarget::AllLists));
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.seed_lists()?,
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_members_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Members(members) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                let list_id = members.list.id;
                self.clear_status();
                self.open_lists(Some(list_id))?;
            }
            KeyCode::Up => members.items.move_selection(-1),
            KeyCode::Down => members.items.move_selection(1),
            KeyCode::PageUp => members.items.move_selection(-PAGE),
            KeyCode::PageDown => members.items.move_selection(PAGE),
            KeyCode::Home => members.items.select_first(),
            KeyCode::End => members.items.select_last(),
            KeyCode::Char('+') => {
                let list_id = members.list.id;
                let state = AddMembersState::load(&self.conn, list_id)?;
                if state.is_empty() {
                    self.set_status(
                        "Every item is already in this list. Add new items with 'i' first.",
                        StatusKind::Error,
                    );
                } else {
                    self.clear_status();
                    return Ok(Mode::AddingMembers(state));
                }
            }
            KeyCode::Char('-') => {
                if let Some(item) = members.items.current().cloned() {
                    let list = members.list.clone();
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(DeleteTarget::Member { list, item }));
                }
                self.set_status("No item selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                self.open_items(None)?;
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Shared key handling for the single-line forms. Returns the form while
    /// it should stay open.
    fn drive_form<F>(
        &mut self,
        code: KeyCode,
        mut form: TextForm,
        cancel_message: &str,
        submit: F,
    ) -> Option<TextForm>
    where
        F: FnOnce(&mut Self, &TextForm) -> Result<()>,
    {
        match code {
            KeyCode::Esc => {
                self.set_status(cancel_message.to_string(), StatusKind::Info);
                return None;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match submit(self, &form) {
                Ok(()) => return None,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Some(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, target: DeleteTarget) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&target) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(target))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(target)),
        }
    }

    fn handle_add_members(&mut self, code: KeyCode, mut state: AddMembersState) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => state.move_selection(-1),
            KeyCode::Down => state.move_selection(1),
            KeyCode::PageUp => state.move_selection(-PAGE),
            KeyCode::PageDown => state.move_selection(PAGE),
            KeyCode::Char(' ') => state.toggle_current(),
            KeyCode::Enter => {
                let mut added = 0usize;
                for item in state.selection() {
                    if let Err(err) = add_item_to_list(&self.conn, state.list_id, item.id) {
                        let err = anyhow::Error::from(err);
                        self.set_status(surface_error(&err), StatusKind::Error);
                        break;
                    }
                    added += 1;
                }
                self.refresh_members()?;
                if added > 0 {
                    let message = if added == 1 {
                        "Item added to list.".to_string()
                    } else {
                        format!("Added {added} items to list.")
                    };
                    self.set_status(message, StatusKind::Info);
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::AddingMembers(state))
    }

    fn select_method(&mut self, method: ChoiceMethod) {
        self.settings.choice_method = method;
        self.result = None;
        if method == ChoiceMethod::FromList && self.lists.is_empty() {
            self.set_status(
                "No lists yet. Press 'i' to add items and 'l' to build a list.",
                StatusKind::Error,
            );
        } else {
            self.clear_status();
        }
    }

    fn select_list(&mut self, offset: isize) {
        if self.lists.is_empty() {
            return;
        }
        self.list_index = cycle_selection(self.list_index, self.lists.len(), offset);
        self.settings.default_list_name = self.current_list().map(|list| list.list_name.clone());
        self.result = None;
    }

    fn current_list(&self) -> Option<&ItemList> {
        self.lists.get(self.list_index)
    }

    fn choose(&mut self) {
        let method = self.settings.choice_method;
        let list_name = self.current_list().map(|list| list.list_name.clone());
        let request = ChoiceRequest {
            method,
            list_name: list_name.as_deref(),
            custom_range: self.settings.custom_dice_range,
        };

        match self.chooser.choose(&self.conn, &request) {
            Ok(Some(choice)) => {
                self.result = Some(choice.to_string());
                self.clear_status();
            }
            Ok(None) => {
                self.result = None;
                self.set_status(
                    format!(
                        "\"{}\" has no items yet. Press 'l' and add some.",
                        list_name.unwrap_or_default()
                    ),
                    StatusKind::Error,
                );
            }
            Err(ChooserError::NoListSelected) => {
                self.result = None;
                self.set_status(
                    "No lists yet. Press 'i' to add items and 'l' to build a list.",
                    StatusKind::Error,
                );
            }
            Err(err) => {
                self.result = None;
                let err = anyhow::Error::from(err);
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }

        if method == ChoiceMethod::RuleCustomDice {
            self.settings.custom_dice_range = self.chooser.last_custom_range();
        }
    }

    fn apply_range(&mut self, form: &TextForm) -> Result<()> {
        let previous = self.settings.custom_dice_range;
        let valid = form
            .value
            .trim()
            .parse::<i64>()
            .is_ok_and(|value| value > 0);
        let range = parse_custom_range(&form.value, previous);

        self.settings.custom_dice_range = range;
        self.chooser.set_last_custom_range(range);
        if valid {
            self.set_status(format!("Custom die rolls 1 to {range}."), StatusKind::Info);
        } else {
            self.set_status(
                format!("Invalid range; keeping 1 to {range}."),
                StatusKind::Error,
            );
        }
        Ok(())
    }

    fn save_new_item(&mut self, form: &TextForm) -> Result<()> {
        let name = form.parse_name("Item")?;
        let item = create_item(&self.conn, &name).context("failed to add item")?;
        self.reload_items(Some(item.id))?;
        self.set_status(format!("Added \"{}\".", item.name), StatusKind::Info);
        Ok(())
    }

    fn save_item_rename(&mut self, id: i64, form: &TextForm) -> Result<()> {
        let name = form.parse_name("Item")?;
        rename_item(&self.conn, id, &name).context("failed to rename item")?;
        self.reload_items(Some(id))?;
        self.set_status(format!("Renamed to \"{name}\"."), StatusKind::Info);
        Ok(())
    }

    fn save_new_list(&mut self, form: &TextForm) -> Result<()> {
        let name = form.parse_name("List")?;
        let list = create_item_list(&self.conn, &name).context("failed to add list")?;
        self.open_lists(Some(list.id))?;
        self.set_status(
            format!("Added \"{}\". Press Enter to fill it.", list.list_name),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_list_rename(&mut self, id: i64, form: &TextForm) -> Result<()> {
        let name = form.parse_name("List")?;
        let old_name = match &self.screen {
            Screen::Lists(picker) => picker
                .rows
                .iter()
                .find(|list| list.id == id)
                .map(|list| list.list_name.clone()),
            _ => None,
        };
        rename_item_list(&self.conn, id, &name).context("failed to rename list")?;
        if old_name.is_some() && self.settings.default_list_name == old_name {
            self.settings.default_list_name = Some(name.clone());
        }
        self.open_lists(Some(id))?;
        self.set_status(format!("Renamed to \"{name}\"."), StatusKind::Info);
        Ok(())
    }

    fn seed_items(&mut self) -> Result<()> {
        let added = seed_default_items(&self.conn).context("failed to add default items")?;
        self.reload_items(None)?;
        let message = match added {
            0 => "Default items are already there.".to_string(),
            1 => "Added 1 default item.".to_string(),
            n => format!("Added {n} default items."),
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn seed_lists(&mut self) -> Result<()> {
        let added =
            seed_default_item_lists(&self.conn).context("failed to add default lists")?;
        let focus = match &self.screen {
            Screen::Lists(picker) => picker.current().map(|list| list.id),
            _ => None,
        };
        self.open_lists(focus)?;
        let message = match added {
            0 => "Default lists are already there.".to_string(),
            1 => "Added 1 default list.".to_string(),
            n => format!("Added {n} default lists."),
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, target: &DeleteTarget) -> Result<()> {
        match target {
            DeleteTarget::Item(item) => {
                delete_item(&self.conn, item.id).context("failed to delete item")?;
                self.reload_items(None)?;
                self.set_status(format!("Deleted \"{}\".", item.name), StatusKind::Info);
            }
            DeleteTarget::AllItems => {
                let deleted = delete_all_items(&self.conn).context("failed to delete items")?;
                self.reload_items(None)?;
                self.set_status(format!("Deleted {deleted} items."), StatusKind::Info);
            }
            DeleteTarget::List(list) => {
                delete_item_list(&self.conn, list.id).context("failed to delete list")?;
                if self.settings.default_list_name.as_deref() == Some(list.list_name.as_str()) {
                    self.settings.default_list_name = None;
                }
                self.open_lists(None)?;
                self.set_status(
                    format!("Deleted \"{}\".", list.list_name),
                    StatusKind::Info,
                );
            }
            DeleteTarget::AllLists => {
                let deleted =
                    delete_all_item_lists(&self.conn).context("failed to delete lists")?;
                self.settings.default_list_name = None;
                self.open_lists(None)?;
                self.set_status(format!("Deleted {deleted} lists."), StatusKind::Info);
            }
            DeleteTarget::Member { list, item } => {
                remove_item_from_list(&self.conn, list.id, item.id)
                    .context("failed to remove item from list")?;
                self.refresh_members()?;
                self.set_status(
                    format!("Removed \"{}\" from \"{}\".", item.name, list.list_name),
                    StatusKind::Info,
                );
            }
        }
        Ok(())
    }

    /// Reload the lists shown on the chooser screen and put the cursor back on
    /// the remembered list.
    fn reload_lists(&mut self) -> Result<()> {
        self.lists = fetch_item_lists(&self.conn).context("failed to load lists")?;
        let remembered = self.settings.default_list_name.as_deref();
        self.list_index = remembered
            .and_then(|name| self.lists.iter().position(|list| list.list_name == name))
            .unwrap_or(0);
        self.settings.default_list_name = self.current_list().map(|list| list.list_name.clone());
        Ok(())
    }

    fn reload_items(&mut self, focus_id: Option<i64>) -> Result<()> {
        let items = fetch_items(&self.conn).context("failed to load items")?;
        if let Screen::Items(picker) = &mut self.screen {
            picker.replace_rows(items, |item| Some(item.id) == focus_id);
        }
        Ok(())
    }

    fn refresh_members(&mut self) -> Result<()> {
        if let Screen::Members(members) = &mut self.screen {
            let items = fetch_items_for_list(&self.conn, members.list.id)
                .context("failed to load list items")?;
            let focus = members.items.current().map(|item| item.id);
            members
                .items
                .replace_rows(items, |item| Some(item.id) == focus);
        }
        Ok(())
    }

    fn open_chooser(&mut self) -> Result<()> {
        self.reload_lists()?;
        self.screen = Screen::Chooser;
        Ok(())
    }

    fn open_items(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.screen = Screen::Items(Picker::new(Vec::new()));
        self.reload_items(focus_id)
    }

    fn open_lists(&mut self, focus_id: Option<i64>) -> Result<()> {
        let lists = fetch_item_lists(&self.conn).context("failed to load lists")?;
        let mut picker = Picker::new(Vec::new());
        picker.replace_rows(lists, |list| Some(list.id) == focus_id);
        self.screen = Screen::Lists(picker);
        Ok(())
    }

    fn open_members(&mut self, list: ItemList) -> Result<()> {
        let items = fetch_items_for_list(&self.conn, list.id).context("failed to load list items")?;
        self.screen = Screen::Members(MembersScreen {
            list,
            items: Picker::new(items),
        });
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Chooser => self.draw_chooser(frame, content_area),
            Screen::Items(picker) => draw_picker(
                frame,
                content_area,
                "Items",
                picker,
                "No items yet. Press '+' to add one or 's' for the sample items.",
            ),
            Screen::Lists(picker) => draw_picker(
                frame,
                content_area,
                "Lists",
                picker,
                "No lists yet. Press '+' to create one or 's' for the default lists.",
            ),
            Screen::Members(members) => draw_picker(
                frame,
                content_area,
                &format!("List: {}", members.list.list_name),
                &members.items,
                "This list is empty. Press '+' to add items.",
            ),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingItem(form) => draw_text_form(frame, area, "Add Item", "Name", form),
            Mode::RenamingItem { form, .. } => {
                draw_text_form(frame, area, "Rename Item", "Name", form)
            }
            Mode::AddingList(form) => draw_text_form(frame, area, "Add List", "Name", form),
            Mode::RenamingList { form, .. } => {
                draw_text_form(frame, area, "Rename List", "Name", form)
            }
            Mode::EditingRange(form) => {
                draw_text_form(frame, area, "Custom Die", "Sides", form)
            }
            Mode::ConfirmDelete(target) => draw_confirm(frame, area, target),
            Mode::AddingMembers(state) => draw_add_members(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_chooser(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(4),
                Constraint::Min(3),
            ])
            .split(area);

        let methods: Vec<Line> = ChoiceMethod::ALL
            .iter()
            .enumerate()
            .map(|(idx, method)| {
                let hotkey = char::from(b'1' + idx as u8);
                radio_line(hotkey, method.label(), *method == self.settings.choice_method)
            })
            .collect();
        let methods = Paragraph::new(methods).block(
            Block::default()
                .borders(Borders::ALL)
                .title("The Choice"),
        );
        frame.render_widget(methods, chunks[0]);

        let list_text = match self.current_list() {
            Some(list) if self.lists.len() > 1 => format!("◀ {} ▶", list.list_name),
            Some(list) => list.list_name.clone(),
            None => "<no lists>".to_string(),
        };
        let dim = Style::default().fg(Color::Gray);
        let options = Paragraph::new(vec![
            Line::from(vec![Span::styled("List: ", dim), Span::raw(list_text)]),
            Line::from(vec![
                Span::styled("Custom die: ", dim),
                Span::raw(format!("1 to {}", self.settings.custom_dice_range)),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).title("Options"));
        frame.render_widget(options, chunks[1]);

        let result = match &self.result {
            Some(text) => Paragraph::new(Line::from(Span::styled(
                text.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))),
            None => Paragraph::new(Line::from(Span::styled(
                "Press Enter or Space to choose.",
                Style::default().fg(Color::DarkGray),
            ))),
        };
        let result = result
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Result"));
        frame.render_widget(result, chunks[2]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingMembers(_)) => &[
                ("[↑↓]", " Navigate   "),
                ("[Space]", " Toggle   "),
                ("[Enter]", " Add   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmDelete(_)) => &[("[Y]", " Confirm   "), ("[N/Esc]", " Cancel")],
            (_, Mode::Normal) => match &self.screen {
                Screen::Chooser => &[
                    ("[1-4 ←→]", " Method   "),
                    ("[↑↓]", " List   "),
                    ("[Enter]", " Choose   "),
                    ("[R]", " Range   "),
                    ("[I]", " Items   "),
                    ("[L]", " Lists   "),
                    ("[Q]", " Quit"),
                ],
                Screen::Items(_) => &[
                    ("[+]", " Add   "),
                    ("[E]", " Rename   "),
                    ("[-]", " Delete   "),
                    ("[D]", " Delete all   "),
                    ("[S]", " Sample items   "),
                    ("[Esc]", " Back"),
                ],
                Screen::Lists(_) => &[
                    ("[Enter]", " Open   "),
                    ("[+]", " Add   "),
                    ("[E]", " Rename   "),
                    ("[-]", " Delete   "),
                    ("[D]", " Delete all   "),
                    ("[S]", " Default lists   "),
                    ("[Esc]", " Back"),
                ],
                Screen::Members(_) => &[
                    ("[+]", " Add items   "),
                    ("[-]", " Remove   "),
                    ("[I]", " Items   "),
                    ("[Esc]", " Back"),
                ],
            },
            _ => &[("[Enter]", " Save   "), ("[Esc]", " Cancel")],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, text)| [Span::styled(*key, key_style), Span::raw(*text)])
            .collect();
        Line::from(spans)
    }
}

fn draw_picker<T: Display>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    picker: &Picker<T>,
    empty_message: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{title} ({})", picker.rows.len()));

    if picker.rows.is_empty() {
        let message = Paragraph::new(empty_message.to_string())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let rows: Vec<ListItem> = picker
        .rows
        .iter()
        .map(|row| ListItem::new(row.to_string()))
        .collect();
    let list = List::new(rows)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_text_form(frame: &mut Frame, area: Rect, title: &str, field: &str, form: &TextForm) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines = vec![form.build_line(field), Line::from("")];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);

    let prefix = format!("{field}: ").len() as u16;
    frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
}

fn draw_confirm(frame: &mut Frame, area: Rect, target: &DeleteTarget) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Confirm Removal")
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines = vec![Line::from(target.prompt())];
    if let Some(detail) = target.detail() {
        lines.push(Line::from(detail));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Y to confirm or N / Esc to cancel.",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn draw_add_members(frame: &mut Frame, area: Rect, state: &AddMembersState) {
    let popup_area = centered_rect(70, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Add Items to List")
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let rows: Vec<ListItem> = state
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let checkbox = if state.is_checked(index) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{checkbox} {}", item.name))
        })
        .collect();

    let list = List::new(rows)
        .block(Block::default().borders(Borders::NONE))
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_item, create_item_list, fetch_item_ids_for_list, open_in_memory};

    fn app() -> App {
        let conn = open_in_memory().unwrap();
        let settings = AppSettings::load_or_create(&conn).unwrap();
        App::new(conn, settings).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn number_keys_select_method() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3')).unwrap();
        assert_eq!(app.settings.choice_method, ChoiceMethod::RuleDice);
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.settings.choice_method, ChoiceMethod::ThrowCoin);
    }

    #[test]
    fn choosing_a_coin_sets_result() {
        let mut app = app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        let result = app.result.clone().unwrap();
        assert!(result == "Heads" || result == "Tails");
    }

    #[test]
    fn from_list_without_lists_reports_status() {
        let mut app = app();
        app.handle_key(KeyCode::Char('1')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.result.is_none());
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }

    #[test]
    fn invalid_range_input_keeps_last_value() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r')).unwrap();
        for _ in 0..3 {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        app.handle_key(KeyCode::Char('0')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.settings.custom_dice_range, 20);

        app.handle_key(KeyCode::Char('r')).unwrap();
        app.handle_key(KeyCode::Backspace).unwrap();
        app.handle_key(KeyCode::Backspace).unwrap();
        type_text(&mut app, "8");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.settings.custom_dice_range, 8);
    }

    #[test]
    fn duplicate_item_keeps_form_open() {
        let mut app = app();
        create_item(&app.conn, "Soup").unwrap();
        app.handle_key(KeyCode::Char('i')).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Soup");
        app.handle_key(KeyCode::Enter).unwrap();
        match &app.mode {
            Mode::AddingItem(form) => assert!(form.error.is_some()),
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn members_can_be_added_from_the_picker() {
        let mut app = app();
        let list = create_item_list(&app.conn, "Lunch").unwrap();
        create_item(&app.conn, "Soup").unwrap();
        create_item(&app.conn, "Pizza").unwrap();

        app.handle_key(KeyCode::Char('l')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(fetch_item_ids_for_list(&app.conn, list.id).unwrap().len(), 2);
    }

    #[test]
    fn lists_screen_seeds_default_lists_once() {
        let mut app = app();
        app.handle_key(KeyCode::Char('l')).unwrap();
        app.handle_key(KeyCode::Char('s')).unwrap();
        app.handle_key(KeyCode::Char('s')).unwrap();

        assert_eq!(fetch_item_lists(&app.conn).unwrap().len(), 2);
        match &app.screen {
            Screen::Lists(picker) => assert_eq!(picker.rows.len(), 2),
            _ => panic!("lists screen should stay open"),
        }
        assert_eq!(
            app.status.as_ref().map(|status| status.text.as_str()),
            Some("Default lists are already there.")
        );
    }

    #[test]
    fn shutdown_remembers_selected_list() {
        let mut app = app();
        create_item_list(&app.conn, "Dinner").unwrap();
        create_item_list(&app.conn, "Lunch").unwrap();
        app.reload_lists().unwrap();
        app.handle_key(KeyCode::Down).unwrap();
        app.shutdown().unwrap();

        let settings = AppSettings::load_or_create(&app.conn).unwrap();
        assert_eq!(settings.default_list_name.as_deref(), Some("Lunch"));
    }
}
