use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use catalog_core::{CategoryId, FamilyId, ProductId};
use catalog_products::{Product, ProductDraft, next_product_code};
use catalog_taxonomy::{Category, CategoryDraft, Family, FamilyDraft};

use super::r#trait::CatalogRepository;
use crate::error::CatalogError;

#[derive(Debug)]
struct CatalogState {
    families: BTreeMap<FamilyId, Family>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    next_family: u64,
    next_category: u64,
    next_product: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            families: BTreeMap::new(),
            categories: BTreeMap::new(),
            products: BTreeMap::new(),
            next_family: 1,
            next_category: 1,
            next_product: 1,
        }
    }
}

impl CatalogState {
    fn ensure_family(&self, family_id: Option<FamilyId>) -> Result<(), CatalogError> {
        match family_id {
            Some(id) if !self.families.contains_key(&id) => Err(CatalogError::InvalidInput(
                format!("family {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn ensure_category(&self, category_id: Option<CategoryId>) -> Result<(), CatalogError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(CatalogError::InvalidInput(
                format!("category {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn code_taken(&self, code: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.code() == code && Some(p.id_typed()) != except)
    }

    /// Next free `P###` code, derived from the most recently created product.
    fn generate_code(&self) -> String {
        let last = self.products.values().next_back().map(Product::code);
        let mut code = next_product_code(last, self.products.len());
        while self.code_taken(&code, None) {
            code = next_product_code(Some(&code), self.products.len());
        }
        code
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. One lock guards all three tables so referential
/// checks and writes happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, CatalogError> {
        self.state
            .read()
            .map_err(|_| CatalogError::Store("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, CatalogError> {
        self.state
            .write()
            .map_err(|_| CatalogError::Store("lock poisoned".to_string()))
    }
}

impl CatalogRepository for InMemoryCatalogStore {
    fn insert_family(&self, draft: FamilyDraft) -> Result<Family, CatalogError> {
        let mut state = self.write()?;
        let family = Family::new(FamilyId::new(state.next_family), draft)?;
        state.next_family += 1;
        state.families.insert(family.id_typed(), family.clone());
        Ok(family)
    }

    fn upsert_family(&self, family: Family) -> Result<(), CatalogError> {
        let mut state = self.write()?;
        let id = family.id_typed();
        state.next_family = state.next_family.max(id.value() + 1);
        state.families.insert(id, family);
        Ok(())
    }

    fn update_family(&self, id: FamilyId, draft: FamilyDraft) -> Result<Family, CatalogError> {
        let mut state = self.write()?;
        let family = state
            .families
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("family {id}")))?;
        family.update(draft)?;
        Ok(family.clone())
    }

    fn delete_family(&self, id: FamilyId) -> Result<Family, CatalogError> {
        let mut state = self.write()?;
        let family = state
            .families
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("family {id}")))?;

        for category in state.categories.values_mut() {
            if category.family_id() == Some(id) {
                category.clear_family();
            }
        }
        for product in state.products.values_mut() {
            if product.family_id() == Some(id) {
                product.clear_family();
            }
        }
        Ok(family)
    }

    fn family(&self, id: FamilyId) -> Result<Option<Family>, CatalogError> {
        Ok(self.read()?.families.get(&id).cloned())
    }

    fn families(&self) -> Result<Vec<Family>, CatalogError> {
        Ok(self.read()?.families.values().cloned().collect())
    }

    fn insert_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        let mut state = self.write()?;
        state.ensure_family(draft.family_id)?;
        let category = Category::new(CategoryId::new(state.next_category), draft)?;
        state.next_category += 1;
        state.categories.insert(category.id_typed(), category.clone());
        Ok(category)
    }

    fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError> {
        let mut state = self.write()?;
        state.ensure_family(draft.family_id)?;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("category {id}")))?;
        category.update(draft)?;
        Ok(category.clone())
    }

    fn delete_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        let mut state = self.write()?;
        let category = state
            .categories
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("category {id}")))?;

        for product in state.products.values_mut() {
            if product.category_id() == Some(id) {
                product.clear_category();
            }
        }
        Ok(category)
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, CatalogError> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    fn categories_by_family(&self, family_id: FamilyId) -> Result<Vec<Category>, CatalogError> {
        Ok(self
            .read()?
            .categories
            .values()
            .filter(|c| c.family_id() == Some(family_id))
            .cloned()
            .collect())
    }

    fn insert_product(&self, mut draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut state = self.write()?;
        state.ensure_family(draft.family_id)?;
        state.ensure_category(draft.category_id)?;

        let blank_code = draft.code.as_deref().is_none_or(|c| c.trim().is_empty());
        if blank_code {
            draft.code = Some(state.generate_code());
        }

        let product = Product::new(ProductId::new(state.next_product), draft)?;
        if state.code_taken(product.code(), None) {
            return Err(CatalogError::Conflict(format!(
                "product code {} is already taken",
                product.code()
            )));
        }

        state.next_product += 1;
        state.products.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut state = self.write()?;
        state.ensure_family(draft.family_id)?;
        state.ensure_category(draft.category_id)?;

        let mut updated = state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;
        updated.update(draft)?;
        if state.code_taken(updated.code(), Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "product code {} is already taken",
                updated.code()
            )));
        }

        state.products.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.write()?
            .products
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.read()?.products.values().cloned().collect())
    }
}
