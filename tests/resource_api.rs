use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use content_api::{app, builtin_catalog, resolve, AppState, MemoryObjectStore, MemoryRecordStore};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const PUBLIC_BASE: &str = "http://storage.test/storage/v1/object/public";

struct TestApp {
    base_url: String,
    records: Arc<MemoryRecordStore>,
    objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    let model = resolve(&builtin_catalog()?)?;
    let records = Arc::new(MemoryRecordStore::new());
    let objects = Arc::new(MemoryObjectStore::new(PUBLIC_BASE));
    let state = AppState::new(model, records.clone(), objects.clone());

    let router = app(state, 1024 * 1024);
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp {
        base_url,
        records,
        objects,
    })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn image(name: &str) -> anyhow::Result<Part> {
    Ok(Part::bytes(b"\x89PNG fake".to_vec())
        .file_name(name.to_string())
        .mime_str("image/png")?)
}

#[tokio::test]
async fn e2e_faq_create_returns_inserted_row() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/faq"))
        .json(&json!({"faq_question": "Q1", "faq_answer": "A1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!([{"id": 1, "faq_question": "Q1", "faq_answer": "A1"}]));
    Ok(())
}

#[tokio::test]
async fn e2e_url_encoded_form_is_accepted() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/dama"))
        .form(&[("dama_whatsapp", "+62 811"), ("dama_tiktok", "@dama")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body[0]["dama_whatsapp"], "+62 811");
    assert_eq!(body[0]["dama_tiktok"], "@dama");
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_work_category_rejected_before_any_write() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .text("work_title", "Rebrand")
        .text("work_category", "Invalid")
        .part("work_main_img", image("cover.png")?);
    let res = client().post(app.url("/works")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "Invalid work_category value"}));
    assert_eq!(app.records.insert_count(), 0);
    assert!(app.objects.objects().is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_include_rejected_on_update() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new().text("services_individual_include", "not-json");
    let res = client()
        .put(app.url("/services_individual/1"))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({"error": "Invalid services_individual_include format. Must be a JSON string."})
    );
    assert_eq!(app.records.update_count(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_create_without_files_writes_null_urls() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/taglines"))
        .json(&json!({"tagline_text": "Make it bold", "tagline_sub_text": "since 2019"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!([{"id": 1, "tagline_text": "Make it bold", "tagline_sub_text": "since 2019", "tagline_img": null}])
    );
    Ok(())
}

#[tokio::test]
async fn e2e_update_without_file_keeps_stored_url() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .text("client_name", "Acme")
        .part("client_logo_img", image("acme logo.png")?);
    let created: Value = client().post(app.url("/ourclients")).multipart(form).send().await?.json().await?;
    let url = created[0]["client_logo_img"].as_str().unwrap_or_default().to_string();
    assert!(url.starts_with(&format!("{}/homebucket/ourclients/", PUBLIC_BASE)));
    assert!(url.ends_with(".png"));

    let res = client()
        .put(app.url("/ourclients/1"))
        .multipart(Form::new().text("client_name", "Acme Corp"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let row: Value = client().get(app.url("/ourclients/1")).send().await?.json().await?;
    assert_eq!(row["client_name"], "Acme Corp");
    assert_eq!(row["client_logo_img"], url.as_str());
    Ok(())
}

#[tokio::test]
async fn e2e_include_array_round_trips_in_order() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .text("services_individual_name", "SEO")
        .text("services_individual_include", r#"["a","b"]"#);
    let res = client().post(app.url("/services_individual")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let row: Value = client().get(app.url("/services_individual/1")).send().await?.json().await?;
    assert_eq!(row["services_individual_include"], json!(["a", "b"]));
    assert_eq!(row["services_individual_img"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn e2e_missing_row_and_unreachable_store_are_client_errors() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = client().delete(app.url("/faq/99")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["error"].is_string());

    let res = client().get(app.url("/faq/99")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    app.records.set_failure(Some("connection refused"));
    let res = client().delete(app.url("/faq/1")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "connection refused"}));
    Ok(())
}

#[tokio::test]
async fn e2e_upload_failure_is_server_error_without_insert() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.objects.set_failing(true);
    let form = Form::new()
        .text("tagline_text", "Hello")
        .part("tagline_img", image("hero.png")?);
    let res = client().post(app.url("/taglines")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "Failed to upload image"}));
    assert_eq!(app.records.insert_count(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_work_images_upload_as_url_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .text("work_title", "Harbour")
        .text("work_category", "Photography")
        .part("work_img", image("one.png")?)
        .part("work_img", image("two.png")?)
        .part("work_img", image("three.png")?)
        .part("work_main_img", image("main.png")?);
    let res = client().post(app.url("/works")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let row = &body[0];

    let urls: Vec<&str> = row["work_img"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].ends_with("-one.png"));
    assert!(urls[1].ends_with("-two.png"));
    assert!(urls[2].ends_with("-three.png"));
    assert!(row["work_main_img"].as_str().unwrap_or_default().ends_with("-main-main.png"));
    assert_eq!(row["work_logo_img"], Value::Null);
    assert_eq!(row["work_category"], "Photography");

    let objects = app.objects.objects();
    assert_eq!(objects.len(), 4);
    assert!(objects.iter().all(|o| o.bucket == "worksbucket"));
    Ok(())
}

#[tokio::test]
async fn e2e_too_many_files_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .part("blog_img", image("a.png")?)
        .part("blog_img", image("b.png")?);
    let res = client().post(app.url("/blogs")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.objects.objects().is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_delete_reports_label_and_row() -> anyhow::Result<()> {
    let app = start_server().await?;
    client()
        .post(app.url("/faq"))
        .json(&json!({"faq_question": "Q1", "faq_answer": "A1"}))
        .send()
        .await?;
    let res = client().delete(app.url("/faq/1")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({"message": "FAQ entry deleted", "data": [{"id": 1, "faq_question": "Q1", "faq_answer": "A1"}]})
    );

    let list: Value = client().get(app.url("/faq")).send().await?.json().await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_blogs_list_by_date() -> anyhow::Result<()> {
    let app = start_server().await?;
    for (title, date) in [("Spring", "2024-03-01"), ("New year", "2024-01-01")] {
        let res = client()
            .post(app.url("/blogs"))
            .json(&json!({"blog_title": title, "blog_date": date}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }
    let list: Value = client().get(app.url("/blogs")).send().await?.json().await?;
    let titles: Vec<&str> = list
        .as_array()
        .map(|a| a.iter().filter_map(|r| r["blog_title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["New year", "Spring"]);
    Ok(())
}

#[tokio::test]
async fn e2e_update_of_missing_row_is_empty() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .put(app.url("/faq/42"))
        .json(&json!({"faq_answer": "A"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_bad_input_shapes_are_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = client().get(app.url("/faq/abc")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "invalid id"}));

    let res = client().post(app.url("/faq")).json(&json!(["not", "an", "object"])).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client()
        .post(app.url("/faq"))
        .multipart(Form::new().part("avatar", image("me.png")?))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.records.insert_count(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_resource_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/products")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "unknown resource: products"}));
    Ok(())
}

#[tokio::test]
async fn e2e_service_routes() -> anyhow::Result<()> {
    let app = start_server().await?;
    let health: Value = client().get(app.url("/health")).send().await?.json().await?;
    assert_eq!(health, json!({"status": "ok"}));

    let res = client().get(app.url("/ready")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    app.records.set_failure(Some("connection refused"));
    let res = client().get(app.url("/ready")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"status": "degraded", "database": "unavailable"}));

    let info: Value = client().get(app.url("/info")).send().await?.json().await?;
    assert_eq!(info["name"], "content-api");
    Ok(())
}

#[tokio::test]
async fn e2e_oversized_body_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let big = "x".repeat(2 * 1024 * 1024);
    let sent = client()
        .post(app.url("/faq"))
        .json(&json!({"faq_question": big}))
        .send()
        .await;
    // The server may answer 413 and close before the client finishes writing.
    if let Ok(res) = sent {
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = res.json().await?;
        assert!(body["error"].is_string());
    }
    assert_eq!(app.records.insert_count(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_oversized_upload_rejected_as_too_large() -> anyhow::Result<()> {
    let app = start_server().await?;
    let huge = Part::bytes(vec![0u8; 2 * 1024 * 1024])
        .file_name("huge.png")
        .mime_str("image/png")?;
    let form = Form::new().text("blog_title", "Big").part("blog_img", huge);
    let sent = client().post(app.url("/blogs")).multipart(form).send().await;
    if let Ok(res) = sent {
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = res.json().await?;
        assert!(body["error"].is_string());
    }
    assert!(app.objects.objects().is_empty());
    assert_eq!(app.records.insert_count(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_unrouted_requests_answer_with_json_errors() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = client()
        .patch(app.url("/faq/1"))
        .json(&json!({"faq_answer": "A"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "method not allowed"}));

    let res = client().get(app.url("/faq/1/extra")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"error": "no route for /faq/1/extra"}));

    let res = client().delete(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn e2e_work_gallery_replaced_only_by_new_files() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new()
        .text("work_title", "Harbour")
        .part("work_img", image("one.png")?)
        .part("work_img", image("two.png")?);
    let res = client().post(app.url("/works")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let form = Form::new().part("work_img", image("three.png")?);
    let res = client().put(app.url("/works/1")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let gallery = body[0]["work_img"].as_array().cloned().unwrap_or_default();
    assert_eq!(gallery.len(), 1);
    assert!(gallery[0].as_str().unwrap_or_default().ends_with("-three.png"));

    let res = client()
        .put(app.url("/works/1"))
        .multipart(Form::new().text("work_title", "Harbour at night"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let row: Value = client().get(app.url("/works/1")).send().await?.json().await?;
    assert_eq!(row["work_title"], "Harbour at night");
    assert_eq!(row["work_img"], Value::Array(gallery));
    assert_eq!(app.objects.objects().len(), 3);
    Ok(())
}
