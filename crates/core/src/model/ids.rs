use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new id from the raw catalog value.
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map($name::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a Lesson.
    LessonId
);
numeric_id!(
    /// Unique identifier for a Topic.
    TopicId
);
numeric_id!(
    /// Unique identifier for a Course.
    CourseId
);
numeric_id!(
    /// Unique identifier for a quiz question.
    QuestionId
);
numeric_id!(
    /// Unique identifier for a question answer.
    AnswerId
);
numeric_id!(
    /// Identifier of a learner's enrollment in a topic.
    UserTopicId
);

/// Unique identifier for a Note.
///
/// Unlike the catalog-owned numeric ids above, note ids are minted on this
/// device, so they are random UUIDs rather than catalog sequence numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one read back from storage.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(NoteId::from_uuid)
            .map_err(|_| ParseIdError { kind: "NoteId" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_display_round_trips() {
        let id = LessonId::new(42);
        assert_eq!(id.to_string(), "42");
        let parsed: LessonId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn numeric_id_rejects_garbage() {
        assert!("not-a-number".parse::<TopicId>().is_err());
        assert!("-3".parse::<QuestionId>().is_err());
    }

    #[test]
    fn answer_ids_order_by_value() {
        assert!(AnswerId::new(5) < AnswerId::new(7));
    }

    #[test]
    fn note_ids_are_unique() {
        assert_ne!(NoteId::generate(), NoteId::generate());
    }

    #[test]
    fn note_id_parses_uuid_text() {
        let id = NoteId::generate();
        let parsed: NoteId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
