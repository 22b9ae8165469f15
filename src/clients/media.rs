use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const MIN_RESOLUTION: (u32, u32) = (300, 300);
pub const MAX_RESOLUTION: (u32, u32) = (2000, 2000);
pub const MAX_IMAGE_SIZE: usize = 3_145_728;

/// Raw upload as handed over by the upload pipeline: bytes plus the
/// dimensions it decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Normalized reference to a stored image.
#[derive(Clone, Debug, Display, Eq, From, Hash, Into, PartialEq, Serialize, Deserialize)]
pub struct ImageRef(pub String);

/// Media collaborator contract, invoked at product-save time. The real
/// pipeline decodes, stores and (above `MAX_RESOLUTION`) downscales; this
/// service only depends on the bounds it enforces.
pub trait MediaStore: Send + Sync {
    fn store(&self, upload: &ImageUpload) -> Result<ImageRef, Error>;
}

/// Reference implementation that enforces the contract bounds and derives
/// a stable stored name. Oversized-but-valid images pass through, since
/// the collaborator downscales them to `MAX_RESOLUTION` on its side.
#[derive(Clone, Debug, Default)]
pub struct BoundedMediaStore;

impl MediaStore for BoundedMediaStore {
    fn store(&self, upload: &ImageUpload) -> Result<ImageRef, Error> {
        if upload.data.len() > MAX_IMAGE_SIZE {
            return Err(Error::ImageConstraint(
                "image must not be larger than 3 MB".into(),
            ));
        }
        let (min_width, min_height) = MIN_RESOLUTION;
        if upload.width < min_width || upload.height < min_height {
            return Err(Error::ImageConstraint(format!(
                "image resolution is below the {}x{} minimum",
                min_width, min_height
            )));
        }

        let stem = upload.file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&upload.file_name);
        Ok(ImageRef(format!("media/{}.jpg", stem)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(width: u32, height: u32, bytes: usize) -> ImageUpload {
        ImageUpload {
            file_name: "pizza.png".into(),
            width,
            height,
            data: vec![0; bytes],
        }
    }

    #[test]
    fn undersized_image_is_rejected() {
        let err = BoundedMediaStore.store(&upload(200, 700, 1024)).unwrap_err();
        assert!(matches!(err, Error::ImageConstraint(_)));
    }

    #[test]
    fn too_large_file_is_rejected() {
        let err = BoundedMediaStore
            .store(&upload(700, 700, MAX_IMAGE_SIZE + 1))
            .unwrap_err();
        assert!(matches!(err, Error::ImageConstraint(_)));
    }

    #[test]
    fn valid_image_gets_a_normalized_reference() {
        let image = BoundedMediaStore.store(&upload(700, 700, 1024)).unwrap();
        assert_eq!(image, ImageRef("media/pizza.jpg".into()));
    }

    #[test]
    fn oversized_resolution_is_accepted_for_downscaling() {
        BoundedMediaStore.store(&upload(2500, 2500, 1024)).unwrap();
    }
}
