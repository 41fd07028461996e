//! Section schema: the ordered, user-editable rating categories.
//!
//! # Responsibility
//! - Own the ordered list of `SectionDefinition`s for one session.
//! - Enforce the add/rename/remove rules of the customize flow.
//!
//! # Invariants
//! - The schema always holds at least one definition.
//! - Section ids are unique and never change after creation.
//! - `version` increases on every successful mutation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a rating category, independent of its display name.
pub type SectionId = Uuid;

/// Icons offered by the customize dialog, as `(identifier, label)`.
pub const ICON_CHOICES: &[(&str, &str)] = &[
    ("fas fa-star", "Star"),
    ("fas fa-user", "User"),
    ("fas fa-briefcase", "Briefcase"),
    ("fas fa-home", "Home"),
    ("fas fa-cogs", "Cogs"),
    ("fas fa-server", "Server"),
    ("fas fa-language", "Language"),
    ("fas fa-heart", "Heart"),
    ("fas fa-plus-circle", "Plus Circle"),
];

/// Icon used when a caller adds a section without choosing one.
pub const DEFAULT_ICON: &str = "fas fa-star";

// Fixed ids keep records attached when the schema falls back to defaults.
const DEFAULT_SECTIONS: &[(u128, &str, &str)] = &[
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0001, "Personal", "fas fa-user"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0002, "Professional", "fas fa-briefcase"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0003, "Family Background", "fas fa-home"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0004, "Skill", "fas fa-cogs"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0005, "System Knowledge", "fas fa-server"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0006, "Languages", "fas fa-language"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0007, "Hobbies", "fas fa-heart"),
    (0x5c0e_ca7d_0000_4000_8000_0000_0000_0008, "Extra", "fas fa-plus-circle"),
];

/// One rating category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    /// Immutable key that record entries point at.
    pub id: SectionId,
    /// Display name, also used for export column headers.
    pub name: String,
    /// Symbolic icon identifier understood by the rendering layer.
    pub icon: String,
}

impl SectionDefinition {
    /// Creates a definition with a freshly generated id.
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Returns the built-in 8-section schema.
pub fn default_sections() -> Vec<SectionDefinition> {
    DEFAULT_SECTIONS
        .iter()
        .map(|(id, name, icon)| SectionDefinition {
            id: Uuid::from_u128(*id),
            name: (*name).to_string(),
            icon: (*icon).to_string(),
        })
        .collect()
}

/// Errors raised by schema mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Section name is blank after trim.
    EmptyName,
    /// Removal would leave the schema without sections.
    LastSection,
    /// Position does not address an existing section.
    IndexOutOfBounds { index: usize, len: usize },
    /// A schema was built from an empty list.
    Empty,
    /// Two definitions share one id.
    DuplicateId(SectionId),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "section name must not be blank"),
            Self::LastSection => write!(f, "at least one section is required"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "section index {index} out of bounds for {len} sections")
            }
            Self::Empty => write!(f, "section schema must not be empty"),
            Self::DuplicateId(id) => write!(f, "duplicate section id: {id}"),
        }
    }
}

impl Error for SchemaError {}

/// Ordered, versioned collection of rating categories.
///
/// One canonical instance lives in the session; every component that needs
/// it borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSchema {
    sections: Vec<SectionDefinition>,
    version: u64,
}

impl Default for SectionSchema {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            version: 0,
        }
    }
}

impl SectionSchema {
    /// Builds a schema from persisted or caller-supplied definitions.
    pub fn from_sections(sections: Vec<SectionDefinition>) -> Result<Self, SchemaError> {
        if sections.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::with_capacity(sections.len());
        for section in &sections {
            if !seen.insert(section.id) {
                return Err(SchemaError::DuplicateId(section.id));
            }
        }
        Ok(Self {
            sections,
            version: 0,
        })
    }

    /// Ordered definitions, in display and export-column order.
    pub fn list(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDefinition> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Mutation counter, starting at 0 for a freshly loaded schema.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, index: usize) -> Option<&SectionDefinition> {
        self.sections.get(index)
    }

    pub fn find(&self, id: SectionId) -> Option<&SectionDefinition> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Finds the first section whose trimmed name matches case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<&SectionDefinition> {
        let needle = name.trim().to_lowercase();
        self.sections
            .iter()
            .find(|section| section.name.trim().to_lowercase() == needle)
    }

    /// Appends a new section and returns its id.
    ///
    /// Duplicate display names are allowed; identity lives in the id.
    pub fn add(&mut self, name: &str, icon: &str) -> Result<SectionId, SchemaError> {
        let name = normalize_name(name).ok_or(SchemaError::EmptyName)?;
        let section = SectionDefinition::new(name, icon);
        let id = section.id;
        self.sections.push(section);
        self.bump();
        Ok(id)
    }

    /// Renames the section at `index`.
    ///
    /// A blank `new_name` is ignored and reported as `Ok(false)`. Existing
    /// record entries stay attached because they reference the id.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<bool, SchemaError> {
        self.check_index(index)?;
        let Some(name) = normalize_name(new_name) else {
            return Ok(false);
        };
        self.sections[index].name = name;
        self.bump();
        Ok(true)
    }

    pub fn set_icon(&mut self, index: usize, icon: &str) -> Result<(), SchemaError> {
        self.check_index(index)?;
        self.sections[index].icon = icon.to_string();
        self.bump();
        Ok(())
    }

    /// Removes the section at `index`, refusing to remove the last one.
    pub fn remove(&mut self, index: usize) -> Result<SectionDefinition, SchemaError> {
        self.check_index(index)?;
        if self.sections.len() <= 1 {
            return Err(SchemaError::LastSection);
        }
        let removed = self.sections.remove(index);
        self.bump();
        Ok(removed)
    }

    /// Replaces all definitions with the built-in defaults.
    pub fn reset_to_defaults(&mut self) {
        self.sections = default_sections();
        self.bump();
    }

    fn check_index(&self, index: usize) -> Result<(), SchemaError> {
        if index >= self.sections.len() {
            return Err(SchemaError::IndexOutOfBounds {
                index,
                len: self.sections.len(),
            });
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
