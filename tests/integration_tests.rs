use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use qrgendec::core::error::{AppError, AppResult};
use qrgendec::wifi::profiles::{WifiBackend, WifiProfile, WifiProfileStore};
use qrgendec::{
    create_routes, decode_bytes, AppState, GeneratedQr, OutputDir, QrOptions, Security, ServerInfo,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

const BOUNDARY: &str = "qrgendec-test-boundary";

struct FixedStore;

impl WifiProfileStore for FixedStore {
    fn backend(&self) -> WifiBackend {
        WifiBackend::Nmcli
    }

    fn list_profiles(&self) -> AppResult<Vec<String>> {
        Ok(vec!["Attic".to_string(), "HomeNet".to_string()])
    }

    fn profile(&self, name: &str) -> AppResult<WifiProfile> {
        let password = match name {
            "HomeNet" => Some("hunter22".to_string()),
            "Attic" => None,
            _ => return Err(AppError::ProfileNotFound(name.to_string())),
        };
        Ok(WifiProfile {
            name: name.to_string(),
            ssid: name.to_string(),
            security: Security::Wpa,
            password,
        })
    }
}

// Helper function to create test app
fn create_test_app(temp_dir: &TempDir) -> Router {
    let state = AppState {
        output: OutputDir::new(temp_dir.path(), "QRcode"),
        qr_options: QrOptions::default(),
        server_info: ServerInfo::new("127.0.0.1", 8080),
        wifi: Arc::new(FixedStore),
    };
    create_routes(state, 10 * 1024 * 1024)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n",
            BOUNDARY, field
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/decode")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "qrgendec");
}

#[tokio::test]
async fn test_info_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder().uri("/api/info").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let info: ServerInfo = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(info.port, 8080);
    assert_eq!(info.ip, "127.0.0.1");
}

#[tokio::test]
async fn test_encode_list_download_decode() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/encode", json!({ "data": "Hello from the encode tab" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let generated: GeneratedQr = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(generated.name, "QRcode_1.png");
    assert!(temp_dir.path().join("QRcode_1.png").exists());

    let request = Request::builder().uri("/api/qr").body(Body::empty()).unwrap();
    let listed = body_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let request = Request::builder()
        .uri(format!("/api/qr/{}", generated.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let png = body_bytes(response).await;

    let codes = decode_bytes(&png).unwrap();
    assert_eq!(codes[0].content, "Hello from the encode tab");

    let response = app.oneshot(multipart_request("image", &png)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["codes"][0]["content"], "Hello from the encode tab");
    assert_eq!(
        report["message"],
        "Decoded QR Code: Hello from the encode tab\nData copied to clipboard."
    );
    assert!(report["wifi"].is_null());
}

#[tokio::test]
async fn test_encode_with_error_correction_override() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .oneshot(json_request("POST", "/api/encode", json!({ "data": "abc", "error_correction": "q" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_encode_empty_text_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .oneshot(json_request("POST", "/api/encode", json!({ "data": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("Invalid input"));
}

#[tokio::test]
async fn test_decode_wifi_code() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);
    let png = qrgendec::render_png("WIFI:S:HomeNet;T:WPA;P:hunter22;;", &QrOptions::default()).unwrap();

    let response = app.oneshot(multipart_request("image", &png)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["wifi"]["ssid"], "HomeNet");
    assert_eq!(report["wifi"]["password"], "hunter22");
    assert_eq!(
        report["message"],
        "SSID: HomeNet\nPassword: hunter22\nPassword copied to clipboard."
    );
}

#[tokio::test]
async fn test_decode_image_without_code() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let blank = image::RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(blank)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();

    let response = app.oneshot(multipart_request("image", &png)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["message"], "No QR Code detected.");
    assert!(report["codes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_decode_not_an_image() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app.oneshot(multipart_request("image", b"plain text")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_wifi_networks_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder().uri("/api/wifi/networks").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(["Attic", "HomeNet"]));
}

#[tokio::test]
async fn test_wifi_share_produces_scannable_code() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .oneshot(json_request("POST", "/api/wifi/share", json!({ "name": "HomeNet" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let codes = decode_bytes(&body_bytes(response).await).unwrap();
    assert_eq!(codes[0].content, "WIFI:S:HomeNet;T:WPA;P:hunter22;;");
    // nothing written to disk for shared passwords
    assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_wifi_share_errors() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/wifi/share", json!({ "name": "Attic" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(json_request("POST", "/api/wifi/share", json!({ "name": "Nowhere" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wifi_qr_from_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/wifi/qr",
            json!({ "ssid": "Cafe", "security": "nopass", "hidden": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let codes = decode_bytes(&body_bytes(response).await).unwrap();
    assert_eq!(codes[0].content, "WIFI:S:Cafe;T:nopass;H:true;;");

    let response = app
        .oneshot(json_request("POST", "/api/wifi/qr", json!({ "ssid": "Cafe", "security": "wpa" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_endpoints() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder().uri("/api/nonexistent").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "API endpoint not found");
}

#[tokio::test]
async fn test_static_file_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder().uri("/some/page").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("QR Code Generator and Decoder"));
}
