use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{Entity, PhotoId, ProductId};

/// Longest storage reference a photo may carry.
pub const URL_PHOTO_MAX: usize = 255;

/// A stored image attached to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    id: PhotoId,
    product_id: ProductId,
    url_photo: String,
    #[serde(with = "profile_flag")]
    profile: bool,
    created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(
        id: PhotoId,
        product_id: ProductId,
        url_photo: impl Into<String>,
        profile: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id,
            url_photo: url_photo.into(),
            profile,
            created_at,
        }
    }

    pub fn id_typed(&self) -> PhotoId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn url_photo(&self) -> &str {
        &self.url_photo
    }

    pub fn is_profile(&self) -> bool {
        self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn set_profile(&mut self, profile: bool) {
        self.profile = profile;
    }
}

impl Entity for Photo {
    type Id = PhotoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// `profile` travels as `0`/`1`.
mod profile_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}
