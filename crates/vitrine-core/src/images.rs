//! Primary/secondary image resolution and absolute URL building.

use crate::catalog::{ImageType, ProductImage};

fn sort_key(image: &ProductImage) -> (i32, i64) {
    (image.display_order, image.id)
}

fn first_of_type(images: &[ProductImage], image_type: ImageType) -> Option<&ProductImage> {
    images
        .iter()
        .filter(|img| img.image_type == image_type)
        .min_by_key(|img| sort_key(img))
}

/// The primary image with the lowest `(display_order, id)`, if any.
#[must_use]
pub fn primary_image(images: &[ProductImage]) -> Option<&ProductImage> {
    first_of_type(images, ImageType::Primary)
}

/// The secondary (back view) image with the lowest `(display_order, id)`, if any.
#[must_use]
pub fn secondary_image(images: &[ProductImage]) -> Option<&ProductImage> {
    first_of_type(images, ImageType::Secondary)
}

/// The image shown on product cards: the primary image, else the first image
/// of any type, else `None`.
#[must_use]
pub fn display_image(images: &[ProductImage]) -> Option<&ProductImage> {
    primary_image(images).or_else(|| images.iter().min_by_key(|img| sort_key(img)))
}

/// Returns `images` sorted by `(display_order, id)`.
#[must_use]
pub fn ordered(images: &[ProductImage]) -> Vec<&ProductImage> {
    let mut sorted: Vec<&ProductImage> = images.iter().collect();
    sorted.sort_by_key(|img| sort_key(img));
    sorted
}

/// Where relative image paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// `scheme://host[:port]` without a trailing slash. `None` leaves URLs host-relative.
    pub base: Option<String>,
    /// Always starts and ends with `/`.
    pub media_prefix: String,
}

impl Origin {
    #[must_use]
    pub fn new(base: Option<String>, media_prefix: impl Into<String>) -> Self {
        Self {
            base: base.map(|b| b.trim_end_matches('/').to_string()),
            media_prefix: media_prefix.into(),
        }
    }
}

fn has_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || url.starts_with("//")
}

/// Resolves a stored image URL into an absolute one.
///
/// URLs carrying a scheme are returned unchanged. Paths starting with `/` are
/// appended to the origin; other relative paths go under the media prefix.
#[must_use]
pub fn absolute_url(url: &str, origin: &Origin) -> String {
    if has_scheme(url) {
        return url.to_string();
    }

    let path = if url.starts_with('/') {
        url.to_string()
    } else {
        format!("{}{url}", origin.media_prefix)
    };

    match &origin.base {
        Some(base) => format!("{base}{path}"),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i64, image_type: ImageType, display_order: i32) -> ProductImage {
        ProductImage {
            id,
            product_id: 1,
            image_url: format!("products/{id}.jpg"),
            alt_text: None,
            image_type,
            display_order,
        }
    }

    fn origin() -> Origin {
        Origin::new(Some("http://shop.test".to_string()), "/media/")
    }

    #[test]
    fn primary_picks_lowest_display_order() {
        let images = vec![
            image(1, ImageType::Primary, 5),
            image(2, ImageType::Primary, 1),
            image(3, ImageType::Other, 0),
        ];
        assert_eq!(primary_image(&images).map(|i| i.id), Some(2));
    }

    #[test]
    fn primary_ties_break_on_id() {
        let images = vec![image(9, ImageType::Primary, 0), image(4, ImageType::Primary, 0)];
        assert_eq!(primary_image(&images).map(|i| i.id), Some(4));
    }

    #[test]
    fn primary_is_none_without_primary_images() {
        let images = vec![image(1, ImageType::Secondary, 0), image(2, ImageType::Other, 0)];
        assert!(primary_image(&images).is_none());
    }

    #[test]
    fn secondary_resolves_independently() {
        let images = vec![image(1, ImageType::Primary, 0), image(2, ImageType::Secondary, 3)];
        assert_eq!(secondary_image(&images).map(|i| i.id), Some(2));
    }

    #[test]
    fn display_image_falls_back_to_first_image() {
        let images = vec![image(5, ImageType::Other, 2), image(6, ImageType::Secondary, 1)];
        assert_eq!(display_image(&images).map(|i| i.id), Some(6));
        assert!(display_image(&[]).is_none());
    }

    #[test]
    fn display_image_prefers_primary() {
        let images = vec![image(5, ImageType::Other, 0), image(6, ImageType::Primary, 9)];
        assert_eq!(display_image(&images).map(|i| i.id), Some(6));
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            absolute_url("https://cdn.example.com/a.jpg", &origin()),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            absolute_url("HTTP://cdn.example.com/a.jpg", &origin()),
            "HTTP://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn rooted_paths_join_origin() {
        assert_eq!(
            absolute_url("/media/products/a.jpg", &origin()),
            "http://shop.test/media/products/a.jpg"
        );
    }

    #[test]
    fn relative_paths_join_media_prefix() {
        assert_eq!(
            absolute_url("products/a.jpg", &origin()),
            "http://shop.test/media/products/a.jpg"
        );
    }

    #[test]
    fn missing_base_yields_host_relative_path() {
        let origin = Origin::new(None, "/media/");
        assert_eq!(absolute_url("a.jpg", &origin), "/media/a.jpg");
    }

    #[test]
    fn origin_trims_trailing_slash() {
        let origin = Origin::new(Some("https://shop.test/".to_string()), "/media/");
        assert_eq!(absolute_url("/x.png", &origin), "https://shop.test/x.png");
    }
}
