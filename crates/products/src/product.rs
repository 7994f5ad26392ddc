use serde::{Deserialize, Serialize};

use catalog_core::validate::{optional_text, required_text};
use catalog_core::{
    CategoryId, DomainError, DomainResult, Entity, FamilyId, ProductId, ValueObject,
};

pub const PRODUCT_CODE_MAX: usize = 100;
pub const PRODUCT_NAME_MAX: usize = 100;

/// Non-negative price in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl ValueObject for Price {}

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Parse a decimal amount such as `"12"`, `"12.5"` or `"12.50"`.
    ///
    /// Negative amounts and more than two fractional digits are rejected.
    pub fn parse_decimal(input: &str) -> DomainResult<Self> {
        let s = input.trim();
        if s.starts_with('-') {
            return Err(DomainError::validation("price must be at least 0"));
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(DomainError::validation("price is required"));
        }
        if frac.len() > 2 {
            return Err(DomainError::validation("price supports at most 2 decimals"));
        }
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !digits_only(whole) || !digits_only(frac) {
            return Err(DomainError::validation(format!("price is not a number: {s}")));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation("price is too large"))?
        };
        let frac: u64 = format!("{frac:0<2}")
            .parse()
            .map_err(|_| DomainError::validation(format!("price is not a number: {s}")))?;

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Self)
            .ok_or_else(|| DomainError::validation("price is too large"))
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Editable product fields, as submitted by a create or edit form.
///
/// `code` may be omitted on create (one is generated); it is required on
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductDraft {
    pub code: Option<String>,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub family_id: Option<FamilyId>,
    pub category_id: Option<CategoryId>,
}

/// Catalog product. Its photos are tracked separately by
/// [`ProductPhotos`](crate::photos::ProductPhotos).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    code: String,
    name: String,
    price: Price,
    description: Option<String>,
    family_id: Option<FamilyId>,
    category_id: Option<CategoryId>,
}

struct ValidatedDraft {
    code: String,
    name: String,
    description: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, draft: ProductDraft) -> DomainResult<Self> {
        let v = Self::validate(&draft)?;
        Ok(Self {
            id,
            code: v.code,
            name: v.name,
            price: draft.price,
            description: v.description,
            family_id: draft.family_id,
            category_id: draft.category_id,
        })
    }

    /// Replace the product details. Photos are never touched here.
    pub fn update(&mut self, draft: ProductDraft) -> DomainResult<()> {
        let v = Self::validate(&draft)?;
        self.code = v.code;
        self.name = v.name;
        self.price = draft.price;
        self.description = v.description;
        self.family_id = draft.family_id;
        self.category_id = draft.category_id;
        Ok(())
    }

    fn validate(draft: &ProductDraft) -> DomainResult<ValidatedDraft> {
        let code = draft
            .code
            .as_deref()
            .ok_or_else(|| DomainError::validation("code cannot be empty"))?;
        Ok(ValidatedDraft {
            code: required_text("code", code, PRODUCT_CODE_MAX)?,
            name: required_text("name", &draft.name, PRODUCT_NAME_MAX)?,
            description: optional_text("description", draft.description.as_deref(), None)?,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn family_id(&self) -> Option<FamilyId> {
        self.family_id
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn clear_family(&mut self) {
        self.family_id = None;
    }

    pub fn clear_category(&mut self) {
        self.category_id = None;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
