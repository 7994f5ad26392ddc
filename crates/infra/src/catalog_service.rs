//! Catalog administration: taxonomy, products and their photos.
//!
//! [`CatalogService`] ties the catalog records to the photo collections. The
//! profile-photo rules live in the `ProductPhotos` aggregate; this layer only
//! decides which photo operation a product operation implies:
//!
//! | Product operation | Photo operation |
//! |---|---|
//! | create with uploads | attach |
//! | update details | none |
//! | edit (details + photo changes) | composite update |
//! | delete | remove all (records and files) |

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use catalog_core::{CategoryId, FamilyId, PhotoId, ProductId};
use catalog_products::{Photo, Product, ProductDraft};
use catalog_taxonomy::{Category, CategoryDraft, Family, FamilyDraft, default_families};

use crate::catalog_store::CatalogRepository;
use crate::error::{CatalogError, ItemFailure};
use crate::listing::{DEFAULT_PAGE_SIZE, Page, ProductQuery, ProductRow};
use crate::photo_manager::{BatchMode, PhotoBatchReport, PhotoChanges, PhotoManager, PhotoUpload};
use crate::photo_store::PhotoStore;
use crate::storage::ImageStorage;

/// A product together with what happened to its photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChange {
    pub product: Product,
    pub photos: PhotoBatchReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    pub product: Product,
    pub family: Option<Family>,
    pub category: Option<Category>,
    pub photos: Vec<Photo>,
    pub profile_photo: Option<Photo>,
}

/// Answer to "may this product be deleted?" for a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeletionCheck {
    pub can_delete: bool,
    pub photo_count: usize,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDeletion {
    pub product: Product,
    pub removed_photos: Vec<PhotoId>,
    /// Stored files that could not be removed.
    pub cleanup_failures: Vec<ItemFailure>,
}

pub struct CatalogService<R, S, I> {
    catalog: R,
    photos: PhotoManager<S, I>,
    page_size: usize,
}

impl<R, S, I> CatalogService<R, S, I> {
    pub fn new(catalog: R, photos: PhotoManager<S, I>) -> Self {
        Self {
            catalog,
            photos,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn catalog(&self) -> &R {
        &self.catalog
    }

    pub fn photo_manager(&self) -> &PhotoManager<S, I> {
        &self.photos
    }
}

impl<R, S, I> CatalogService<R, S, I>
where
    R: CatalogRepository,
    S: PhotoStore,
    I: ImageStorage,
{
    // -- families ---------------------------------------------------------

    /// Insert or refresh the default families. Safe to run repeatedly.
    pub fn seed_default_families(&self) -> Result<usize, CatalogError> {
        let families = default_families();
        let count = families.len();
        for family in families {
            self.catalog.upsert_family(family)?;
        }
        info!(count, "default families seeded");
        Ok(count)
    }

    pub fn create_family(&self, draft: FamilyDraft) -> Result<Family, CatalogError> {
        let family = self.catalog.insert_family(draft)?;
        info!(family_id = %family.id_typed(), "family created");
        Ok(family)
    }

    pub fn update_family(&self, id: FamilyId, draft: FamilyDraft) -> Result<Family, CatalogError> {
        self.catalog.update_family(id, draft)
    }

    /// Delete a family. Its categories and products stay, unlinked.
    pub fn delete_family(&self, id: FamilyId) -> Result<Family, CatalogError> {
        let family = self.catalog.delete_family(id)?;
        info!(family_id = %id, "family deleted");
        Ok(family)
    }

    pub fn family(&self, id: FamilyId) -> Result<Family, CatalogError> {
        self.catalog
            .family(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("family {id}")))
    }

    pub fn families(&self) -> Result<Vec<Family>, CatalogError> {
        self.catalog.families()
    }

    // -- categories -------------------------------------------------------

    pub fn create_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        let category = self.catalog.insert_category(draft)?;
        info!(category_id = %category.id_typed(), "category created");
        Ok(category)
    }

    pub fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogError> {
        self.catalog.update_category(id, draft)
    }

    /// Delete a category. Its products stay, unlinked.
    pub fn delete_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        let category = self.catalog.delete_category(id)?;
        info!(category_id = %id, "category deleted");
        Ok(category)
    }

    pub fn category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        self.catalog
            .category(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("category {id}")))
    }

    pub fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.catalog.categories()
    }

    /// Categories of a family; no family selected means no categories.
    pub fn categories_by_family(
        &self,
        family_id: Option<FamilyId>,
    ) -> Result<Vec<Category>, CatalogError> {
        match family_id {
            Some(id) => self.catalog.categories_by_family(id),
            None => Ok(vec![]),
        }
    }

    // -- products ---------------------------------------------------------

    /// Create a product and attach its initial photos.
    ///
    /// If the photos cannot be committed the product is dropped again. This
    /// covers an aborted all-or-nothing batch as well as a store failure or
    /// conflict in either mode; failed uploads in best-effort mode are only
    /// reported.
    pub fn create_product(
        &self,
        draft: ProductDraft,
        uploads: Vec<PhotoUpload>,
        mode: BatchMode,
    ) -> Result<ProductChange, CatalogError> {
        let product = self.catalog.insert_product(draft)?;
        let product_id = product.id_typed();

        let photos = if uploads.is_empty() {
            PhotoBatchReport::default()
        } else {
            match self.photos.attach_photos(product_id, uploads, mode) {
                Ok(report) => report,
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "photos rejected; rolling back product");
                    self.catalog.delete_product(product_id)?;
                    return Err(e.into());
                }
            }
        };

        info!(
            product_id = %product_id,
            code = product.code(),
            photos = photos.photo_count,
            "product created"
        );
        Ok(ProductChange { product, photos })
    }

    /// Update product details. Photos are left exactly as they are.
    pub fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, CatalogError> {
        let product = self.catalog.update_product(id, draft)?;
        debug!(product_id = %id, "product details updated");
        Ok(product)
    }

    /// Update details and apply photo changes from an edit form.
    ///
    /// In all-or-nothing mode a rejected photo change restores the previous
    /// details.
    pub fn edit_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        changes: PhotoChanges,
        mode: BatchMode,
    ) -> Result<ProductChange, CatalogError> {
        let previous = self.product(id)?;
        let product = self.catalog.update_product(id, draft)?;

        let photos = if changes.is_empty() {
            let mut report = PhotoBatchReport::default();
            let current = self.photos.photos(id)?;
            report.photo_count = current.len();
            report.profile_photo = current.profile_photo().map(Photo::id_typed);
            report
        } else {
            match self.photos.update_photos(id, changes, mode) {
                Ok(report) => report,
                Err(e) => {
                    warn!(product_id = %id, error = %e, "photo changes rejected; restoring details");
                    self.catalog.update_product(id, draft_of(&previous))?;
                    return Err(e.into());
                }
            }
        };

        info!(
            product_id = %id,
            attached = photos.attached.len(),
            removed = photos.removed.len(),
            failed = photos.failed.len(),
            "product edited"
        );
        Ok(ProductChange { product, photos })
    }

    /// Delete a product together with all its photos and stored files.
    pub fn delete_product(&self, id: ProductId) -> Result<ProductDeletion, CatalogError> {
        self.product(id)?;
        let photos = self.photos.remove_all(id)?;
        let product = self.catalog.delete_product(id)?;

        info!(
            product_id = %id,
            photos = photos.removed.len(),
            cleanup_failures = photos.cleanup_failures.len(),
            "product deleted"
        );
        Ok(ProductDeletion {
            product,
            removed_photos: photos.removed,
            cleanup_failures: photos.cleanup_failures,
        })
    }

    pub fn check_deletion(&self, id: ProductId) -> Result<ProductDeletionCheck, CatalogError> {
        self.product(id)?;
        let photo_count = self.photos.photos(id)?.len();
        let message = (photo_count > 0).then(|| {
            format!(
                "Este producto tiene {photo_count} foto(s) asociada(s). Se eliminarán junto con el producto."
            )
        });
        Ok(ProductDeletionCheck {
            can_delete: true,
            photo_count,
            message,
        })
    }

    pub fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.catalog
            .product(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    pub fn product_details(&self, id: ProductId) -> Result<ProductDetails, CatalogError> {
        let product = self.product(id)?;
        let family = match product.family_id() {
            Some(family_id) => self.catalog.family(family_id)?,
            None => None,
        };
        let category = match product.category_id() {
            Some(category_id) => self.catalog.category(category_id)?,
            None => None,
        };
        let photos = self.photos.photos(id)?;

        Ok(ProductDetails {
            profile_photo: photos.profile_photo().cloned(),
            photos: photos.photos().to_vec(),
            product,
            family,
            category,
        })
    }

    pub fn reassign_profile_photo(
        &self,
        product_id: ProductId,
        photo_id: PhotoId,
    ) -> Result<PhotoBatchReport, CatalogError> {
        self.product(product_id)?;
        Ok(self.photos.reassign_profile(product_id, photo_id)?)
    }

    /// Products index: search, family filter, one page of rows with their
    /// profile photo.
    pub fn list_products(&self, query: &ProductQuery) -> Result<Page<ProductRow>, CatalogError> {
        let family_names: HashMap<FamilyId, String> = self
            .catalog
            .families()?
            .into_iter()
            .map(|f| (f.id_typed(), f.name().to_string()))
            .collect();
        let category_names: HashMap<CategoryId, String> = self
            .catalog
            .categories()?
            .into_iter()
            .map(|c| (c.id_typed(), c.name().to_string()))
            .collect();

        let rows: Vec<ProductRow> = self
            .catalog
            .products()?
            .iter()
            .map(|product| {
                let mut row = ProductRow::new(product);
                row.family_name = row.family_id.and_then(|id| family_names.get(&id).cloned());
                row.category_name = row
                    .category_id
                    .and_then(|id| category_names.get(&id).cloned());
                row
            })
            .filter(|row| query.matches(row))
            .collect();

        let per_page = query.per_page.unwrap_or(self.page_size);
        let mut page = Page::paginate(rows, query.page, per_page);
        for row in &mut page.data {
            let photos = self.photos.photos(row.id)?;
            row.photo_count = photos.len();
            row.profile_photo = photos.profile_photo().cloned();
        }

        debug!(total = page.total, page = page.current_page, "products listed");
        Ok(page)
    }
}

fn draft_of(product: &Product) -> ProductDraft {
    ProductDraft {
        code: Some(product.code().to_string()),
        name: product.name().to_string(),
        price: product.price(),
        description: product.description().map(str::to_string),
        family_id: product.family_id(),
        category_id: product.category_id(),
    }
}
