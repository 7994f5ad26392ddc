use serde::{Deserialize, Serialize};

use catalog_core::validate::{optional_text, required_text};
use catalog_core::{DomainResult, Entity, FamilyId};

pub const FAMILY_NAME_MAX: usize = 100;

/// Input for creating or updating a family.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FamilyDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Top-level grouping of the catalog (e.g. "Bebidas").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    id: FamilyId,
    name: String,
    description: Option<String>,
}

impl Family {
    pub fn new(id: FamilyId, draft: FamilyDraft) -> DomainResult<Self> {
        let (name, description) = Self::validate(&draft)?;
        Ok(Self {
            id,
            name,
            description,
        })
    }

    /// Replace the editable fields. On error the family is left untouched.
    pub fn update(&mut self, draft: FamilyDraft) -> DomainResult<()> {
        let (name, description) = Self::validate(&draft)?;
        self.name = name;
        self.description = description;
        Ok(())
    }

    fn validate(draft: &FamilyDraft) -> DomainResult<(String, Option<String>)> {
        let name = required_text("name", &draft.name, FAMILY_NAME_MAX)?;
        let description = optional_text("description", draft.description.as_deref(), None)?;
        Ok((name, description))
    }

    pub fn id_typed(&self) -> FamilyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for Family {
    type Id = FamilyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
