use serde::{Deserialize, Serialize};

use catalog_core::validate::{optional_text, required_text};
use catalog_core::{CategoryId, DomainResult, Entity, FamilyId};

pub const CATEGORY_NAME_MAX: usize = 100;
pub const CATEGORY_LOGO_MAX: usize = 100;

/// Input for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub family_id: Option<FamilyId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    logo: Option<String>,
    family_id: Option<FamilyId>,
}

struct Validated {
    name: String,
    description: Option<String>,
    logo: Option<String>,
}

impl Category {
    pub fn new(id: CategoryId, draft: CategoryDraft) -> DomainResult<Self> {
        let v = Self::validate(&draft)?;
        Ok(Self {
            id,
            name: v.name,
            description: v.description,
            logo: v.logo,
            family_id: draft.family_id,
        })
    }

    pub fn update(&mut self, draft: CategoryDraft) -> DomainResult<()> {
        let v = Self::validate(&draft)?;
        self.name = v.name;
        self.description = v.description;
        self.logo = v.logo;
        self.family_id = draft.family_id;
        Ok(())
    }

    fn validate(draft: &CategoryDraft) -> DomainResult<Validated> {
        Ok(Validated {
            name: required_text("name", &draft.name, CATEGORY_NAME_MAX)?,
            description: optional_text("description", draft.description.as_deref(), None)?,
            logo: optional_text("logo", draft.logo.as_deref(), Some(CATEGORY_LOGO_MAX))?,
        })
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    pub fn family_id(&self) -> Option<FamilyId> {
        self.family_id
    }

    /// Detach from a family that is being removed.
    pub fn clear_family(&mut self) {
        self.family_id = None;
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::DomainError;

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            description: Some("Quesos frescos y madurados".to_string()),
            logo: Some("quesos.png".to_string()),
            family_id: Some(FamilyId::new(1)),
        }
    }

    #[test]
    fn new_category_keeps_family_link() {
        let category = Category::new(CategoryId::new(3), draft("Quesos")).unwrap();
        assert_eq!(category.family_id(), Some(FamilyId::new(1)));
        assert_eq!(category.logo(), Some("quesos.png"));
    }

    #[test]
    fn logo_length_is_bounded() {
        let mut d = draft("Quesos");
        d.logo = Some("x".repeat(CATEGORY_LOGO_MAX + 1));
        let err = Category::new(CategoryId::new(3), d).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("logo")));
    }

    #[test]
    fn clear_family_detaches() {
        let mut category = Category::new(CategoryId::new(3), draft("Quesos")).unwrap();
        category.clear_family();
        assert_eq!(category.family_id(), None);
    }
}
