//! Domain models that mirror the `students` table. These stay plain data
//! holders; persistence lives in `db` and presentation in `ui`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Courses a student can be enrolled in. The order matches the selector in
/// the add/edit form, and the first entry is the default choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Course {
    #[default]
    Biology,
    Math,
    Astronomy,
    Physics,
}

impl Course {
    pub const ALL: [Course; 4] = [
        Course::Biology,
        Course::Math,
        Course::Astronomy,
        Course::Physics,
    ];

    /// Text persisted in the `course` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Course::Biology => "Biology",
            Course::Math => "Math",
            Course::Astronomy => "Astronomy",
            Course::Physics => "Physics",
        }
    }

    fn index(self) -> usize {
        Course::ALL
            .iter()
            .position(|course| *course == self)
            .unwrap_or(0)
    }

    /// Next course in selector order, wrapping around.
    pub fn next(self) -> Course {
        Course::ALL[(self.index() + 1) % Course::ALL.len()]
    }

    /// Previous course in selector order, wrapping around.
    pub fn previous(self) -> Course {
        let len = Course::ALL.len();
        Course::ALL[(self.index() + len - 1) % len]
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Course {
    type Err = ValidationError;

    /// Exact match against the persisted labels; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Course::ALL
            .into_iter()
            .find(|course| course.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCourse(s.to_string()))
    }
}

/// One row of the `students` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    /// Store-assigned key. Never reused and never changed after insert; it is
    /// the only handle used to target updates and deletes.
    pub id: i64,
    pub name: String,
    pub course: Course,
    pub mobile: String,
}

/// Validated field values ready to be written by `create` or `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub name: String,
    pub course: Course,
    pub mobile: String,
}

impl StudentInput {
    /// Trim and check the user-supplied fields. Name and mobile must be
    /// non-empty after trimming; mobile has no format rules beyond that.
    pub fn new(name: &str, course: Course, mobile: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let mobile = mobile.trim();
        if mobile.is_empty() {
            return Err(ValidationError::EmptyMobile);
        }
        Ok(Self {
            name: name.to_string(),
            course,
            mobile: mobile.to_string(),
        })
    }
}
