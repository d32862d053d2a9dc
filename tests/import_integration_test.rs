use anyhow::Result;
use httpmock::prelude::*;
use searchdesk::app::actions::documents::upload_bulk_documents;
use searchdesk::config::{SettingsOverrides, TomlConfig};
use searchdesk::domain::model::ImportReport;
use searchdesk::utils::message::MessageKind;
use searchdesk::{BulkImportPipeline, ImportEngine, LocalStorage, Settings};
use serde_json::json;
use tempfile::TempDir;

fn settings_for(server: &MockServer) -> Settings {
    let overrides = SettingsOverrides {
        host: Some(server.host()),
        port: Some(server.port()),
        api_key: Some("secret".to_string()),
        ..Default::default()
    };
    Settings::merge(overrides, TomlConfig::default())
}

async fn mock_products_schema(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/collections/products")
                .header("X-TYPESENSE-API-KEY", "secret");
            then.status(200).json_body(json!({
                "name": "products",
                "fields": [
                    {"name": "name", "type": "string"},
                    {"name": "price", "type": "float"},
                    {"name": "in_stock", "type": "bool", "optional": true}
                ]
            }));
        })
        .await
}

fn write_upload(dir: &TempDir, name: &str, content: &str) -> Result<()> {
    std::fs::write(dir.path().join(name), content)?;
    Ok(())
}

fn engine_for(
    dir: &TempDir,
    settings: Settings,
    file: &str,
) -> Result<ImportEngine<BulkImportPipeline<LocalStorage, Settings>>> {
    let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
    let pipeline = BulkImportPipeline::new(storage, settings, "products", file)?;
    Ok(ImportEngine::new(pipeline))
}

#[tokio::test]
async fn test_csv_upload_is_imported() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(
        &dir,
        "products.csv",
        "Name,Price\nWidget,12.5\nGadget,3\n",
    )?;

    let server = MockServer::start_async().await;
    let schema_mock = mock_products_schema(&server).await;
    let import_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/collections/products/documents/import")
                .query_param("action", "upsert")
                .body_contains("\"name\":\"Widget\"")
                .body_contains("\"price\":12.5");
            then.status(200)
                .body("{\"success\":true}\n{\"success\":true}\n");
        })
        .await;

    let engine = engine_for(&dir, settings_for(&server), "products.csv")?;
    let upload = upload_bulk_documents(&engine).await;

    schema_mock.assert_async().await;
    import_mock.assert_async().await;
    assert_eq!(upload.message.kind, MessageKind::Redirect);
    assert_eq!(upload.message.message, "/collections/products/documents");
    assert_eq!(
        upload.report,
        Some(ImportReport::Imported {
            collection: "products".to_string(),
            count: 2
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_rows_are_never_submitted() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(
        &dir,
        "products.json",
        r#"[{"name": "Widget", "price": "abc"}, {"name": "Gadget", "price": 3}, {"price": 4}]"#,
    )?;

    let server = MockServer::start_async().await;
    mock_products_schema(&server).await;
    let import_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/collections/products/documents/import");
            then.status(200).body("{\"success\":true}");
        })
        .await;

    let engine = engine_for(&dir, settings_for(&server), "products.json")?;
    let upload = upload_bulk_documents(&engine).await;

    import_mock.assert_hits_async(0).await;
    assert_eq!(upload.message.kind, MessageKind::Error);
    assert_eq!(upload.message.message, "Data validation failed");
    match upload.report {
        Some(ImportReport::Rejected(failure)) => {
            assert_eq!(failure.errors.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        }
        other => panic!("unexpected report: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_rejected_documents_are_reported_per_row() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(&dir, "products.csv", "name,price\nWidget,1\nGadget,2\n")?;

    let server = MockServer::start_async().await;
    mock_products_schema(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/collections/products/documents/import");
            then.status(200).body(
                "{\"success\":true}\n{\"success\":false,\"error\":\"Document is too large\",\"document\":\"{}\"}\n",
            );
        })
        .await;

    let engine = engine_for(&dir, settings_for(&server), "products.csv")?;
    let upload = upload_bulk_documents(&engine).await;

    assert_eq!(upload.message.kind, MessageKind::Error);
    match upload.report {
        Some(ImportReport::PartiallyFailed {
            imported, failures, ..
        }) => {
            assert_eq!(imported, 1);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].row, 1);
            assert_eq!(failures[0].error, "Document is too large");
        }
        other => panic!("unexpected report: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_dry_run_validates_without_importing() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(&dir, "products.csv", "name,price\nWidget,1\n")?;

    let server = MockServer::start_async().await;
    mock_products_schema(&server).await;
    let import_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/collections/products/documents/import");
            then.status(200).body("{\"success\":true}");
        })
        .await;

    let engine = engine_for(&dir, settings_for(&server), "products.csv")?.dry_run(true);
    let upload = upload_bulk_documents(&engine).await;

    import_mock.assert_hits_async(0).await;
    assert_eq!(upload.message.kind, MessageKind::Success);
    assert_eq!(
        upload.report,
        Some(ImportReport::Validated {
            collection: "products".to_string(),
            count: 1
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_upload_skips_schema_lookup() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(&dir, "products.json", "[]")?;

    let server = MockServer::start_async().await;
    let schema_mock = mock_products_schema(&server).await;

    let engine = engine_for(&dir, settings_for(&server), "products.json")?;
    let upload = upload_bulk_documents(&engine).await;

    schema_mock.assert_hits_async(0).await;
    assert_eq!(upload.message.message, "At least one document is required.");
    Ok(())
}

#[tokio::test]
async fn test_unsupported_file_becomes_error_message() -> Result<()> {
    let dir = TempDir::new()?;
    write_upload(&dir, "products.txt", "name\nWidget\n")?;

    let server = MockServer::start_async().await;
    let engine = engine_for(&dir, settings_for(&server), "products.txt")?;
    let upload = upload_bulk_documents(&engine).await;

    assert_eq!(upload.message.kind, MessageKind::Error);
    assert!(upload.report.is_none());
    Ok(())
}
