use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ValidationError;
use crate::models::{Course, StudentInput, StudentRecord};

/// Internal representation of the add/edit student form.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    /// Raw name as typed; trimmed only on submit.
    pub(crate) name: String,
    /// Selector value, Biology until the user cycles it.
    pub(crate) course: Course,
    /// Raw mobile number as typed.
    pub(crate) mobile: String,
    /// Field receiving keystrokes.
    pub(crate) active: StudentField,
    /// Last validation or store error shown inside the dialog.
    pub(crate) error: Option<String>,
}

/// Fields available within the student form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum StudentField {
    #[default]
    Name,
    Course,
    Mobile,
}

impl StudentField {
    fn next(self) -> Self {
        match self {
            StudentField::Name => StudentField::Course,
            StudentField::Course => StudentField::Mobile,
            StudentField::Mobile => StudentField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            StudentField::Name => StudentField::Mobile,
            StudentField::Course => StudentField::Name,
            StudentField::Mobile => StudentField::Course,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Course => "Course",
            StudentField::Mobile => "Mobile",
        }
    }
}

impl StudentForm {
    /// Populate the form from an existing record when editing.
    pub(crate) fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            course: record.course,
            mobile: record.mobile.clone(),
            active: StudentField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    /// Step the course selector. Ignored unless the course field has focus.
    pub(crate) fn cycle_course(&mut self, forward: bool) -> bool {
        if self.active != StudentField::Course {
            return false;
        }
        self.course = if forward {
            self.course.next()
        } else {
            self.course.previous()
        };
        true
    }

    /// Append a character to the active text field. On the course selector a
    /// space advances to the next course.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            StudentField::Name => {
                self.name.push(ch);
                true
            }
            StudentField::Mobile => {
                self.mobile.push(ch);
                true
            }
            StudentField::Course => ch == ' ' && self.cycle_course(true),
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Name => {
                self.name.pop();
            }
            StudentField::Mobile => {
                self.mobile.pop();
            }
            StudentField::Course => {}
        }
    }

    /// Validate the inputs and return trimmed values ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<StudentInput, ValidationError> {
        StudentInput::new(&self.name, self.course, &self.mobile)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: StudentField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, is_empty) = match field {
            StudentField::Name => text_display(&self.name),
            StudentField::Mobile => text_display(&self.mobile),
            StudentField::Course => (format!("< {} >", self.course), false),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if is_empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Terminal column of the text cursor relative to the start of the
    /// field's line, measured in display cells so wide and combining
    /// characters line up with what `build_line` rendered.
    pub(crate) fn cursor_column(&self, field: StudentField) -> u16 {
        let value = match field {
            StudentField::Name => self.name.as_str(),
            StudentField::Mobile => self.mobile.as_str(),
            StudentField::Course => "",
        };
        display_width(&format!("{}: ", field.label()), value)
    }
}

/// Combined display width of a field prefix and its value.
pub(crate) fn display_width(prefix: &str, value: &str) -> u16 {
    let width = Span::raw(prefix).width() + Span::raw(value).width();
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn text_display(value: &str) -> (String, bool) {
    if value.is_empty() {
        ("<required>".to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

/// Snapshot of the record awaiting a yes/no before it is deleted.
#[derive(Clone)]
pub(crate) struct ConfirmStudentDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmStudentDelete {
    pub(crate) fn from_record(record: &StudentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

/// Query typed into the search dialog.
#[derive(Default, Clone)]
pub(crate) struct SearchForm {
    pub(crate) query: String,
    pub(crate) error: Option<String>,
}

impl SearchForm {
    /// Label rendered in front of the query.
    pub(crate) const PREFIX: &'static str = "Name: ";

    /// Display column of the cursor after the typed query.
    pub(crate) fn cursor_column(&self) -> u16 {
        display_width(Self::PREFIX, &self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_form_defaults_to_first_course() {
        let form = StudentForm::default();
        assert_eq!(form.course, Course::Biology);
        assert_eq!(form.active, StudentField::Name);
    }

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = StudentForm::default();
        for ch in "Ann".chars() {
            assert!(form.push_char(ch));
        }
        form.next_field();
        assert!(!form.push_char('x'));
        assert!(form.push_char(' '));
        form.next_field();
        for ch in "555".chars() {
            form.push_char(ch);
        }
        form.backspace();

        assert_eq!(form.name, "Ann");
        assert_eq!(form.course, Course::Math);
        assert_eq!(form.mobile, "55");
    }

    #[test]
    fn course_only_cycles_with_focus() {
        let mut form = StudentForm::default();
        assert!(!form.cycle_course(true));
        form.previous_field();
        form.previous_field();
        assert_eq!(form.active, StudentField::Course);
        assert!(form.cycle_course(false));
        assert_eq!(form.course, Course::Physics);
    }

    #[test]
    fn parse_inputs_reports_missing_fields() {
        let mut form = StudentForm::default();
        assert_eq!(form.parse_inputs(), Err(ValidationError::EmptyName));
        form.name = "Ann".into();
        assert_eq!(form.parse_inputs(), Err(ValidationError::EmptyMobile));
        form.mobile = " 555-0100 ".into();
        let input = form.parse_inputs().unwrap();
        assert_eq!(input.mobile, "555-0100");
    }

    #[test]
    fn cursor_column_counts_display_cells() {
        let mut form = StudentForm::default();
        assert_eq!(form.cursor_column(StudentField::Name), 6);

        form.name = "日本語".into();
        assert_eq!(form.cursor_column(StudentField::Name), 6 + 6);

        form.mobile = "e\u{301}1".into();
        assert_eq!(form.cursor_column(StudentField::Mobile), 8 + 2);

        let search = SearchForm {
            query: "李".into(),
            error: None,
        };
        assert_eq!(search.cursor_column(), 6 + 2);
    }

    #[test]
    fn from_record_copies_fields() {
        let record = StudentRecord {
            id: 7,
            name: "Bob".into(),
            course: Course::Astronomy,
            mobile: "555-0107".into(),
        };
        let form = StudentForm::from_record(&record);
        assert_eq!(form.name, "Bob");
        assert_eq!(form.course, Course::Astronomy);
        assert_eq!(form.mobile, "555-0107");
        assert!(form.error.is_none());
    }
}
