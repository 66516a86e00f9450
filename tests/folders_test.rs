//! Integration tests for folder operations.

use serde_json::json;
use std::time::Duration;
use watana::{Client, FileEnvelope, SendFolderRequest, Signer, WatanaError};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::new(server.uri(), "tok-123").unwrap()
}

#[tokio::test]
async fn test_consult_folder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operacion": "consultar_carpeta",
            "carpeta_codigo": "C-0001"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "mensaje": "Carpeta encontrada",
            "estado": "FIRMADO",
            "solicitud_numero": "00000001234",
            "firmado_en": "2026-01-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = client_for(&mock_server)
        .folders()
        .consult("C-0001")
        .await
        .unwrap();

    assert!(status.success);
    assert_eq!(status.status.as_deref(), Some("FIRMADO"));
    assert_eq!(status.request_number.as_deref(), Some("00000001234"));
    assert_eq!(status.extra["firmado_en"], "2026-01-01T10:00:00Z");
}

#[tokio::test]
async fn test_send_folder_payload() {
    let mock_server = MockServer::start().await;
    let file = FileEnvelope::from_bytes("contrato", "pdf", b"%PDF-1.7 contrato").unwrap();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operacion": "enviar_carpeta",
            "carpeta_codigo": "C-0002",
            "titulo": "Contrato de servicios",
            "expiracion_en_horas": 72,
            "firmante": {
                "nombre_completo": "Ana Quispe",
                "email": "ana@example.com"
            },
            "archivos": [{ "nombre_archivo": "contrato", "zip_base64": file.content.clone() }],
            "observador": "legal@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "mensaje": "Carpeta enviada",
            "solicitud_numero": "00000005678"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .folders()
        .send(SendFolderRequest {
            folder_code: "C-0002".to_string(),
            title: "Contrato de servicios".to_string(),
            signer: Signer {
                full_name: "Ana Quispe".to_string(),
                email: "ana@example.com".to_string(),
                ..Default::default()
            },
            files: vec![file.clone()],
            expiration_hours: Some(72),
            extra: json!({ "observador": "legal@example.com", "titulo": "ignored" })
                .as_object()
                .cloned(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.request_number.as_deref(), Some("00000005678"));
}

#[tokio::test]
async fn test_download_folder_as_json() {
    let mock_server = MockServer::start().await;
    let file = FileEnvelope::from_bytes("acta", "pdf", b"%PDF acta").unwrap();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operacion": "descargar_carpeta" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "mensaje": "ok",
            "solicitud_numero": "00000000777",
            "archivos": [file]
        })))
        .mount(&mock_server)
        .await;

    let download = client_for(&mock_server)
        .folders()
        .download("C-0003")
        .await
        .unwrap();

    assert_eq!(download.request_number, "00000000777");
    assert_eq!(download.files[0].decode().unwrap(), b"%PDF acta");
}

#[tokio::test]
async fn test_delete_folder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operacion": "eliminar_carpeta",
            "carpeta_codigo": "C-0004"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "mensaje": "La carpeta ya fue firmada"
        })))
        .mount(&mock_server)
        .await;

    let envelope = client_for(&mock_server)
        .folders()
        .delete("C-0004")
        .await
        .unwrap();

    assert!(!envelope.success);
    assert_eq!(envelope.message, "La carpeta ya fue firmada");
}

#[tokio::test]
async fn test_consult_folder_cancelled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "mensaje": "ok" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .folders()
        .consult_with_cancel("C-0001", tokio::time::sleep(Duration::from_millis(50)))
        .await;

    assert!(matches!(result, Err(WatanaError::Cancelled)));
}

#[tokio::test]
async fn test_download_completes_before_cancel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "mensaje": "Archivo descargado correctamente",
            "solicitud_numero": "00000001234",
            "archivos": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .folders()
        .download_with_cancel("C-0001", tokio::time::sleep(Duration::from_secs(10)))
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.files.is_empty());
}
