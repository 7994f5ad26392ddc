//! Product listing: search, family filter and pagination.

use serde::Serialize;

use catalog_core::{CategoryId, FamilyId, ProductId};
use catalog_products::{Photo, Price, Product};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Listing filters as submitted by the products index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    /// Case-insensitive substring over name, code, description, family name
    /// and category name. Blank means no search.
    pub search: Option<String>,
    pub family_id: Option<FamilyId>,
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    /// Falls back to the configured page size.
    pub per_page: Option<usize>,
}

impl ProductQuery {
    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_family(mut self, family_id: FamilyId) -> Self {
        self.family_id = Some(family_id);
        self
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, row: &ProductRow) -> bool {
        if self.family_id.is_some() && row.family_id != self.family_id {
            return false;
        }
        let Some(needle) = self.needle() else {
            return true;
        };

        [
            Some(row.name.as_str()),
            Some(row.code.as_str()),
            row.description.as_deref(),
            row.family_name.as_deref(),
            row.category_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One line of the products index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub family_id: Option<FamilyId>,
    pub family_name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub photo_count: usize,
    pub profile_photo: Option<Photo>,
}

impl ProductRow {
    pub fn new(product: &Product) -> Self {
        Self {
            id: product.id_typed(),
            code: product.code().to_string(),
            name: product.name().to_string(),
            price: product.price(),
            description: product.description().map(str::to_string),
            family_id: product.family_id(),
            family_name: None,
            category_id: product.category_id(),
            category_name: None,
            photo_count: 0,
            profile_photo: None,
        }
    }
}

/// A page of results, shaped like a length-aware paginator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub last_page: usize,
    /// 1-based position of the first item on this page.
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) out of the full result set.
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current_page = page.max(1);
        let total = items.len();
        let last_page = total.div_ceil(per_page).max(1);

        let start = (current_page - 1).saturating_mul(per_page);
        let data: Vec<T> = items.into_iter().skip(start).take(per_page).collect();
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(start + 1), Some(start + data.len()))
        };

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}
