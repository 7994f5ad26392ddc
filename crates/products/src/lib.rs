//! Products domain module.
//!
//! Products, their photos, and the profile-photo rules, implemented as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod code;
pub mod image;
pub mod photo;
pub mod photos;
pub mod product;
pub mod profile;

pub use code::next_product_code;
pub use image::{ImageFormat, ImageUpload};
pub use photo::Photo;
pub use photos::{
    AttachPhotos, CompositeUpdate, DeletePhotos, IncomingPhoto, PhotoAttached, PhotoCommand,
    PhotoEvent, PhotoRemoved, ProductPhotos, ProfileAssigned, ReassignProfile,
};
pub use product::{Price, Product, ProductDraft};
