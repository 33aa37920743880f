use httpmock::prelude::*;
use product_sync::core::report::summary;
use product_sync::{
    DirectusClient, HttpImageFetcher, LocalStorage, MedusaClient, ReportWriter, SyncConfig,
    SyncEngine, SyncError,
};
use tempfile::TempDir;

struct Services {
    directus: MockServer,
    medusa: MockServer,
}

fn config(dry_run: bool, prune: bool) -> SyncConfig {
    SyncConfig {
        directus_email: "editor@example.com".to_string(),
        directus_password: "cms-secret".to_string(),
        medusa_email: "admin@example.com".to_string(),
        medusa_password: "shop-secret".to_string(),
        max_retries: 0,
        dry_run,
        prune,
        ..SyncConfig::default()
    }
}

fn engine(
    services: &Services,
    config: SyncConfig,
) -> SyncEngine<DirectusClient, MedusaClient, HttpImageFetcher, SyncConfig> {
    let source = DirectusClient::new(
        &services.directus.base_url(),
        &config.directus_email,
        &config.directus_password,
        &config.directus_collection,
        5,
    )
    .unwrap();
    let target = MedusaClient::new(
        &services.medusa.base_url(),
        &config.medusa_email,
        &config.medusa_password,
        config.max_retries,
        5,
    )
    .unwrap()
    .with_backoff_base_ms(0);
    let images = HttpImageFetcher::new(5).unwrap();
    SyncEngine::new(source, target, images, config)
}

/// Directus holds "Mug" (already in Medusa) and "Shirt" (new); Medusa also
/// holds "Old Poster", which is gone from Directus.
fn start_services() -> Services {
    let directus = MockServer::start();
    let medusa = MockServer::start();

    directus.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200)
            .json_body(serde_json::json!({"data": {"access_token": "tok"}}));
    });
    directus.mock(|when, then| {
        when.method(GET).path("/items/products");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {"id": 1, "name": "Mug", "description": "Stoneware", "price": "9.50",
                 "images": ["img-mug"]},
                {"id": 2, "name": "Shirt", "description": "Linen", "price": 25,
                 "images": ["img-shirt", "img-missing"]}
            ]
        }));
    });
    directus.mock(|when, then| {
        when.method(GET).path("/assets/img-mug");
        then.status(200)
            .header("Content-Type", "image/jpeg")
            .body("MUGBYTES");
    });
    directus.mock(|when, then| {
        when.method(GET).path("/assets/img-shirt");
        then.status(200)
            .header("Content-Type", "image/png")
            .body("SHIRTBYTES");
    });
    directus.mock(|when, then| {
        when.method(GET).path("/assets/img-missing");
        then.status(404);
    });

    medusa.mock(|when, then| {
        when.method(POST).path("/admin/auth");
        then.status(200)
            .json_body(serde_json::json!({"user": {"id": "usr_1"}}));
    });
    medusa.mock(|when, then| {
        when.method(GET).path("/admin/products").query_param("q", "Mug");
        then.status(200).json_body(serde_json::json!({
            "products": [{"id": "prod_mug", "title": "Mug"}], "count": 1
        }));
    });
    medusa.mock(|when, then| {
        when.method(GET).path("/admin/products").query_param("q", "Shirt");
        then.status(200)
            .json_body(serde_json::json!({"products": [], "count": 0}));
    });
    medusa.mock(|when, then| {
        when.method(GET)
            .path("/admin/products")
            .query_param("offset", "0");
        then.status(200).json_body(serde_json::json!({
            "products": [
                {"id": "prod_mug", "title": "Mug"},
                {"id": "prod_poster", "title": "Old Poster"}
            ],
            "count": 2
        }));
    });
    medusa.mock(|when, then| {
        when.method(POST)
            .path("/admin/uploads")
            .body_contains("MUGBYTES");
        then.status(200).json_body(serde_json::json!({
            "uploads": [{"url": "http://cdn.shop/mug.jpg"}]
        }));
    });
    medusa.mock(|when, then| {
        when.method(POST)
            .path("/admin/uploads")
            .body_contains("SHIRTBYTES");
        then.status(200).json_body(serde_json::json!({
            "uploads": [{"url": "http://cdn.shop/shirt.png"}]
        }));
    });

    Services { directus, medusa }
}

#[tokio::test]
async fn test_full_sync_against_mock_services() {
    let services = start_services();

    let update_mock = services.medusa.mock(|when, then| {
        when.method(POST)
            .path("/admin/products/prod_mug")
            .json_body(serde_json::json!({
                "title": "Mug",
                "description": "Stoneware",
                "images": ["http://cdn.shop/mug.jpg"]
            }));
        then.status(200)
            .json_body(serde_json::json!({"product": {"id": "prod_mug", "title": "Mug"}}));
    });
    let create_mock = services.medusa.mock(|when, then| {
        when.method(POST)
            .path("/admin/products")
            .json_body(serde_json::json!({
                "title": "Shirt",
                "description": "Linen",
                "images": ["http://cdn.shop/shirt.png"],
                "variants": [{"prices": [{"amount": 2500, "currency_code": "usd"}]}]
            }));
        then.status(200)
            .json_body(serde_json::json!({"product": {"id": "prod_shirt", "title": "Shirt"}}));
    });
    let delete_mock = services.medusa.mock(|when, then| {
        when.method(DELETE).path("/admin/products/prod_poster");
        then.status(200)
            .json_body(serde_json::json!({"id": "prod_poster", "deleted": true}));
    });

    let report = tokio_test::assert_ok!(engine(&services, config(false, true)).run().await);

    update_mock.assert();
    create_mock.assert();
    delete_mock.assert();

    assert_eq!(report.count("update"), 1);
    assert_eq!(report.count("create"), 1);
    assert_eq!(report.count("delete"), 1);
    assert!(!report.has_failures());
    assert_eq!(report.actions[1].images_uploaded, 1);
    assert_eq!(report.actions[1].images_failed, 1);
    assert_eq!(
        summary(&report),
        "2 products in Directus; applied: 1 created, 1 updated, 1 deleted; 0 failed"
    );

    let temp_dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(LocalStorage::new(temp_dir.path()));
    writer.write(&report, "sync-report.csv").await.unwrap();
    let csv = std::fs::read_to_string(temp_dir.path().join("sync-report.csv")).unwrap();
    assert!(csv.contains("update,Mug,prod_mug,applied,prod_mug,,1,0"));
    assert!(csv.contains("create,Shirt,,applied,prod_shirt,,1,1"));
    assert!(csv.contains("delete,Old Poster,prod_poster,applied,prod_poster,,0,0"));
}

#[tokio::test]
async fn test_dry_run_sends_no_mutations() {
    let services = start_services();

    let mutations = services.medusa.mock(|when, then| {
        when.method(POST).path_contains("/admin/products");
        then.status(500);
    });
    let deletes = services.medusa.mock(|when, then| {
        when.method(DELETE);
        then.status(500);
    });

    let report = engine(&services, config(true, true)).run().await.unwrap();

    mutations.assert_hits(0);
    deletes.assert_hits(0);
    assert!(report.dry_run);
    assert_eq!(
        summary(&report),
        "2 products in Directus; planned: 1 created, 1 updated, 1 deleted; 0 failed"
    );
}

#[tokio::test]
async fn test_failed_create_is_reported_and_run_continues() {
    let services = start_services();

    services.medusa.mock(|when, then| {
        when.method(POST).path("/admin/products/prod_mug");
        then.status(200)
            .json_body(serde_json::json!({"product": {"id": "prod_mug", "title": "Mug"}}));
    });
    services.medusa.mock(|when, then| {
        when.method(POST).path("/admin/products");
        then.status(400)
            .json_body(serde_json::json!({"type": "invalid_data", "message": "bad variant"}));
    });

    let report = engine(&services, config(false, false)).run().await.unwrap();

    assert_eq!(report.count("update"), 1);
    assert_eq!(report.failures(), 1);
    let failed = &report.actions[1];
    assert_eq!(failed.action.title(), "Shirt");
    assert_eq!(failed.outcome.status(), "failed");
    // prune disabled
    assert_eq!(report.actions.len(), 2);
}

#[tokio::test]
async fn test_medusa_login_failure_aborts_run() {
    let services = Services {
        directus: MockServer::start(),
        medusa: MockServer::start(),
    };
    services.directus.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200)
            .json_body(serde_json::json!({"data": {"access_token": "tok"}}));
    });
    let items = services.directus.mock(|when, then| {
        when.method(GET).path("/items/products");
        then.status(200).json_body(serde_json::json!({"data": []}));
    });
    services.medusa.mock(|when, then| {
        when.method(POST).path("/admin/auth");
        then.status(401);
    });

    let result = engine(&services, config(false, true)).run().await;

    items.assert_hits(0);
    assert!(matches!(result, Err(SyncError::AuthError { service: "medusa", .. })));
}
