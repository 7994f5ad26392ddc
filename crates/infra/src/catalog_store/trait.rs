use std::sync::Arc;

use catalog_core::{CategoryId, FamilyId, ProductId};
use catalog_products::{Product, ProductDraft};
use catalog_taxonomy::{Category, CategoryDraft, Family, FamilyDraft};

use crate::error::CatalogError;

/// Persistence boundary for the catalog records.
///
/// Implementations must:
/// - reject links to families/categories that do not exist (`InvalidInput`);
/// - keep product codes unique (`Conflict`), generating one when the draft
///   has none;
/// - detach (not delete) categories and products when their family or
///   category is deleted;
/// - list records in id order.
pub trait CatalogRepository: Send + Sync {
    fn insert_family(&self, draft: FamilyDraft) -> Result<Family, CatalogError>;

    /// Insert or overwrite a family under its own id (seeding).
    fn upsert_family(&self, family: Family) -> Result<(), CatalogError>;

    fn update_family(&self, id: FamilyId, draft: FamilyDraft) -> Result<Family, CatalogError>;

    fn delete_family(&self, id: FamilyId) -> Result<Family, CatalogError>;

    fn family(&self, id: FamilyId) -> Result<Option<Family>, CatalogError>;

    fn families(&self) -> Result<Vec<Family>, CatalogError>;

    fn insert_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError>;

    fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError>;

    fn delete_category(&self, id: CategoryId) -> Result<Category, CatalogError>;

    fn category(&self, id: CategoryId) -> Result<Option<Category>, CatalogError>;

    fn categories(&self) -> Result<Vec<Category>, CatalogError>;

    fn categories_by_family(&self, family_id: FamilyId) -> Result<Vec<Category>, CatalogError>;

    fn insert_product(&self, draft: ProductDraft) -> Result<Product, CatalogError>;

    fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product, CatalogError>;

    fn delete_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;

    fn products(&self) -> Result<Vec<Product>, CatalogError>;
}

impl<S> CatalogRepository for Arc<S>
where
    S: CatalogRepository + ?Sized,
{
    fn insert_family(&self, draft: FamilyDraft) -> Result<Family, CatalogError> {
        (**self).insert_family(draft)
    }

    fn upsert_family(&self, family: Family) -> Result<(), CatalogError> {
        (**self).upsert_family(family)
    }

    fn update_family(&self, id: FamilyId, draft: FamilyDraft) -> Result<Family, CatalogError> {
        (**self).update_family(id, draft)
    }

    fn delete_family(&self, id: FamilyId) -> Result<Family, CatalogError> {
        (**self).delete_family(id)
    }

    fn family(&self, id: FamilyId) -> Result<Option<Family>, CatalogError> {
        (**self).family(id)
    }

    fn families(&self) -> Result<Vec<Family>, CatalogError> {
        (**self).families()
    }

    fn insert_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        (**self).insert_category(draft)
    }

    fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError> {
        (**self).update_category(id, draft)
    }

    fn delete_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        (**self).delete_category(id)
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, CatalogError> {
        (**self).category(id)
    }

    fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        (**self).categories()
    }

    fn categories_by_family(&self, family_id: FamilyId) -> Result<Vec<Category>, CatalogError> {
        (**self).categories_by_family(family_id)
    }

    fn insert_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        (**self).insert_product(draft)
    }

    fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product, CatalogError> {
        (**self).update_product(id, draft)
    }

    fn delete_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        (**self).delete_product(id)
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        (**self).product(id)
    }

    fn products(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).products()
    }
}
