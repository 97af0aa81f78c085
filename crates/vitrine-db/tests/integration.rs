//! Offline unit tests for vitrine-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use rust_decimal::Decimal;
use vitrine_core::{AppConfig, Environment, Product};
use vitrine_db::{DbError, PoolConfig, ProductRow, SeedSummary};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        jwt_secret: "secret".to_string(),
        public_base_url: None,
        media_prefix: "/media/".to_string(),
        access_token_ttl_mins: 60,
        refresh_token_ttl_mins: 10_080,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        rate_limit_max_requests: 120,
        rate_limit_window_secs: 60,
    }
}

fn product_row(size_policy: &str) -> ProductRow {
    use chrono::Utc;

    ProductRow {
        id: 42_i64,
        name: "Silver Field Watch".to_string(),
        description: None,
        base_price: Decimal::new(24_900, 2),
        is_active: true,
        size_policy: size_policy.to_string(),
        stock_quantity: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn product_row_converts_to_domain_product() {
    let product = Product::try_from(product_row("multiple")).expect("valid row");
    assert_eq!(product.id, 42);
    assert_eq!(product.size_policy, vitrine_core::SizePolicy::Multiple);
    assert_eq!(product.base_price, Decimal::new(24_900, 2));
}

#[test]
fn product_row_with_unknown_policy_is_corrupt() {
    let err = Product::try_from(product_row("per-colour")).unwrap_err();
    assert!(matches!(err, DbError::Corrupt(_)));
    assert!(err.to_string().contains("per-colour"));
}

#[test]
fn seed_summary_starts_empty() {
    let summary = SeedSummary::default();
    assert_eq!(summary.products, 0);
    assert_eq!(summary.variants, 0);
    assert_eq!(summary.deleted_variants, 0);
}
