pub mod app_config;
pub mod auth;
pub mod catalog;
pub mod catalog_file;
pub mod config;
pub mod filters;
pub mod images;
pub mod memory;
pub mod presentation;
pub mod repository;
pub mod stock;

pub use app_config::{AppConfig, Environment};
pub use auth::{
    authenticate, pick_login_candidate, Argon2Hasher, AuthError, CredentialHasher, LoginCandidate,
};
pub use catalog::{
    Category, ImageType, Product, ProductGroup, ProductImage, ProductSize, ProductVariant,
    SizePolicy,
};
pub use catalog_file::{load_catalog, CatalogFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{ProductFilters, RawProductQuery};
pub use images::{absolute_url, display_image, primary_image, secondary_image, Origin};
pub use presentation::{PresentedImage, PresentedProduct, ProductDetail, SizeOption};
pub use repository::{get_product_detail, list_products, CatalogRepository};
pub use stock::{total_stock, unit_price, StockSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid size policy: {0}")]
    InvalidSizePolicy(String),
    #[error("invalid image type: {0}")]
    InvalidImageType(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("catalog validation failed: {0}")]
    Validation(String),
}
