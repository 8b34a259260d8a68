mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use ticketera::database::models::Rol;

#[tokio::test]
async fn mis_tickets_requires_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/tickets/mis_tickets", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_ticket_rejects_administrators() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (access, _) = common::tokens_for("root", "root@example.com", Rol::Admin);

    let res = client
        .post(format!("{}/tickets/create_ticket", server.base_url))
        .bearer_auth(access)
        .json(&json!({
            "asunto": "Pantalla azul",
            "descripcion": "El equipo se reinicia solo",
            "categoria_id": 1,
            "urgencia": "alta",
            "prioridad": "alta"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FORBIDDEN");

    Ok(())
}

#[tokio::test]
async fn send_message_requires_ticket_id_query() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (access, _) = common::tokens_for("ana", "ana@example.com", Rol::Normal);

    // id_ticket missing from the query string
    let res = client
        .post(format!("{}/tickets/send_message", server.base_url))
        .bearer_auth(access)
        .json(&json!({ "mensaje": "hola" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn asignar_consultor_requires_admin_role() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (access, _) = common::tokens_for("ana", "ana@example.com", Rol::Normal);

    let res = client
        .put(format!("{}/tickets/1/asignar_consultor", server.base_url))
        .bearer_auth(access)
        .json(&json!({ "consultor_id": 2 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn cerrar_ticket_requires_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/tickets/1/cerrar_ticket", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
