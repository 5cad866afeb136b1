use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{debug, info, warn};

use crate::db::RecordStore;
use crate::error::{AppError, DataStoreError, ValidationError};
use crate::models::StudentRecord;
use crate::view::RosterView;

use super::forms::{ConfirmStudentDelete, SearchForm, StudentField, StudentForm};
use super::helpers::{centered_rect, offset_index, student_row, COLUMN_HEADERS};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the roster table.
enum Mode {
    Normal,
    Adding(StudentForm),
    Editing { id: i64, form: StudentForm },
    ConfirmDelete(ConfirmStudentDelete),
    Searching(SearchForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// Application state for the roster window. The store and the view are
/// handed in by the caller; every dialog works through this struct instead of
/// reaching for a shared global.
pub struct App {
    store: RecordStore,
    view: RosterView,
    cursor: usize,
    highlighted: Vec<usize>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: RecordStore, view: RosterView) -> Self {
        Self {
            store,
            view,
            cursor: 0,
            highlighted: Vec::new(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn view(&self) -> &RosterView {
        &self.view
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add_student(code, form)?,
            Mode::Editing { id, form } => self.handle_edit_student(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(search) => self.handle_search(code, search)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.view.len().saturating_sub(1),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Adding(StudentForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                if let Some(record) = self.current_record().cloned() {
                    self.clear_status();
                    return self.open_editor(record);
                }
                self.set_status("No student selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') => {
                if let Some(record) = self.current_record() {
                    let confirm = ConfirmStudentDelete::from_record(record);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No student selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchForm::default()));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_course(false);
            }
            KeyCode::Right => {
                form.cycle_course(true);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_student(&form) {
                Ok(_) => keep_open = false,
                Err(err) => self.report_form_error(&mut form, &err),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Adding(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_student(&mut self, code: KeyCode, id: i64, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_course(false);
            }
            KeyCode::Right => {
                form.cycle_course(true);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_student(id, &form) {
                Ok(()) => keep_open = false,
                // The record is gone and the view was refreshed without it,
                // so there is nothing left to edit.
                Err(AppError::Validation(ValidationError::MissingRecord(_))) => keep_open = false,
                Err(err) => self.report_form_error(&mut form, &err),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Editing { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmStudentDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(()) | Err(AppError::Validation(_)) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut search: SearchForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                Ok(Mode::Normal)
            }
            KeyCode::Enter => match self.run_search(&search.query) {
                Ok(true) => Ok(Mode::Normal),
                Ok(false) => {
                    search.error = Some(format!("No student named \"{}\".", search.query));
                    Ok(Mode::Searching(search))
                }
                Err(err) => {
                    let message = err.to_string();
                    search.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Ok(Mode::Searching(search))
                }
            },
            KeyCode::Backspace => {
                search.query.pop();
                search.error = None;
                Ok(Mode::Searching(search))
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    search.query.push(ch);
                    search.error = None;
                }
                Ok(Mode::Searching(search))
            }
            _ => Ok(Mode::Searching(search)),
        }
    }

    fn report_form_error(&mut self, form: &mut StudentForm, err: &AppError) {
        let message = err.to_string();
        form.error = Some(message.clone());
        self.set_status(message, StatusKind::Error);
    }

    /// Open the edit dialog only if the record still exists in the store.
    fn open_editor(&mut self, record: StudentRecord) -> Result<Mode> {
        match self.store.read_by_id(record.id) {
            Ok(Some(current)) => Ok(Mode::Editing {
                id: current.id,
                form: StudentForm::from_record(&current),
            }),
            Ok(None) => {
                self.reload_after_missing(record.id);
                Ok(Mode::Normal)
            }
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Error);
                Ok(Mode::Normal)
            }
        }
    }

    fn save_new_student(&mut self, form: &StudentForm) -> Result<(), AppError> {
        let input = form.parse_inputs()?;
        let applied = self.view.mutate(&self.store, |store| {
            store.create(&input.name, input.course, &input.mobile)
        })?;
        let record = applied.outcome;
        self.settle_mutation(
            applied.reload,
            Some(record.id),
            format!("Added {} (#{}).", record.name, record.id),
        );
        Ok(())
    }

    fn save_existing_student(&mut self, id: i64, form: &StudentForm) -> Result<(), AppError> {
        let input = form.parse_inputs()?;
        let applied = self.view.mutate(&self.store, |store| {
            store.update(id, &input.name, input.course, &input.mobile)
        })?;
        if applied.outcome == 0 {
            return Err(self.report_missing(id, applied.reload));
        }
        self.settle_mutation(
            applied.reload,
            Some(id),
            format!("Updated {} (#{id}).", input.name),
        );
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmStudentDelete) -> Result<(), AppError> {
        let applied = self
            .view
            .mutate(&self.store, |store| store.delete(confirm.id))?;
        if applied.outcome == 0 {
            return Err(self.report_missing(confirm.id, applied.reload));
        }
        self.settle_mutation(
            applied.reload,
            None,
            format!("Deleted {} (#{}).", confirm.name, confirm.id),
        );
        Ok(())
    }

    /// Update cursor and status once the store has accepted a change. The
    /// change is committed even when the reload failed, so the dialog that
    /// triggered it must still close; only the status line reports the
    /// stale table.
    fn settle_mutation(
        &mut self,
        reload: Result<(), DataStoreError>,
        focus_id: Option<i64>,
        done: String,
    ) {
        match reload {
            Ok(()) => {
                self.after_reload(focus_id);
                self.set_status(done, StatusKind::Info);
            }
            Err(err) => {
                warn!(error = %err, "roster reload failed after a committed change");
                self.after_reload(None);
                self.set_status(
                    format!("{done} The table could not be reloaded: {err}"),
                    StatusKind::Error,
                );
            }
        }
    }

    fn report_missing(&mut self, id: i64, reload: Result<(), DataStoreError>) -> AppError {
        self.after_reload(None);
        let missing = ValidationError::MissingRecord(id);
        match reload {
            Ok(()) => self.set_status(missing.to_string(), StatusKind::Error),
            Err(err) => self.set_status(format!("{missing} {err}"), StatusKind::Error),
        }
        missing.into()
    }

    /// Look the name up in the store, then select every matching row of the
    /// current snapshot. Returns `false` when nothing matched.
    fn run_search(&mut self, query: &str) -> Result<bool, AppError> {
        let stored = self.store.read_by_name(query)?;
        self.highlighted.clear();

        let positions = self.view.select_by_name(query);
        debug!(
            stored = stored.len(),
            displayed = positions.len(),
            "search by name"
        );

        let Some(&first) = positions.first() else {
            self.set_status(format!("\"{query}\" not found."), StatusKind::Error);
            return Ok(false);
        };

        self.cursor = first;
        let count = positions.len();
        self.highlighted = positions;
        let noun = if count == 1 { "student" } else { "students" };
        self.set_status(format!("Found {count} {noun} named \"{query}\"."), StatusKind::Info);
        Ok(true)
    }

    /// Called after the view has been rebuilt. Search highlights refer to old
    /// row positions, so they are dropped.
    fn after_reload(&mut self, focus_id: Option<i64>) {
        self.highlighted.clear();
        if let Some(position) = focus_id.and_then(|id| self.view.position_of(id)) {
            self.cursor = position;
            return;
        }
        self.clamp_cursor();
    }

    fn reload_after_missing(&mut self, id: i64) {
        info!(id, "student vanished before it could be edited");
        match self.view.refresh(&self.store) {
            Ok(_) => {
                self.after_reload(None);
                self.set_status(ValidationError::MissingRecord(id).to_string(), StatusKind::Error);
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    fn current_record(&self) -> Option<&StudentRecord> {
        self.view.get(self.cursor)
    }

    fn move_cursor(&mut self, offset: isize) {
        self.cursor = offset_index(self.cursor, offset, self.view.len());
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.view.len() {
            self.cursor = self.view.len().saturating_sub(1);
        }
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

        self.draw_table(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_student_form(frame, area, "Insert Student Data", form),
            Mode::Editing { form, .. } => {
                self.draw_student_form(frame, area, "Update Student Data", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(search) => self.draw_search(frame, area, search),
            Mode::Normal => {}
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Student Management System")
            .borders(Borders::ALL);

        if self.view.is_empty() {
            let paragraph = Paragraph::new("No students yet. Press + to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let rows = self
            .view
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, record)| student_row(record, self.highlighted.contains(&idx)));
        let header = Row::new(COLUMN_HEADERS)
            .style(Style::default().add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Length(12),
            Constraint::Percentage(30),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(table, area, &mut state);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Adding(_) | Mode::Editing { .. } => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Course   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Submit   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Keep"),
            ]),
            Mode::Searching(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[E]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[F]", key_style),
                Span::raw(" Search   "),
                Span::styled("[Q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = [StudentField::Name, StudentField::Course, StudentField::Mobile];
        let mut lines: Vec<Line> = fields.iter().map(|field| form.build_line(*field)).collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to submit • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active != StudentField::Course {
            let row = fields
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let cursor_x = inner.x.saturating_add(form.cursor_column(form.active));
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmStudentDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Student")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete {} (#{})?", confirm.name, confirm.id)),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, search: &SearchForm) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search Student");
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let hint = match &search.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            None => Span::styled(
                "Exact, case-sensitive name match.",
                Style::default().fg(Color::Gray),
            ),
        };
        let lines = vec![
            Line::from(format!("{}{}", SearchForm::PREFIX, search.query)),
            Line::from(""),
            Line::from(hint),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x.saturating_add(search.cursor_column());
        frame.set_cursor_position((cursor_x, inner.y));
    }
}
