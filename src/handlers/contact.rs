use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Email-to-SMS gateway domains by carrier.
const CARRIER_GATEWAYS: &[(&str, &str)] = &[
    ("verizon", "vtext.com"),
    ("att", "txt.att.net"),
    ("tmobile", "tmomail.net"),
    ("sprint", "messaging.sprintpcs.com"),
];

const SMS_PREVIEW_CHARS: usize = 140;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone_number: Option<String>,
    pub carrier: Option<String>,
}

/// Relay a contact-form submission to the support inbox, with an optional
/// SMS copy through the carrier's email gateway.
pub async fn send_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.subject.trim().is_empty()
        || payload.message.trim().is_empty()
    {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let phone_line = payload
        .phone_number
        .as_deref()
        .map(|p| format!("<p><strong>Phone:</strong> {}</p>", p))
        .unwrap_or_default();

    let html_body = format!(
        "<h3>New Contact Form Submission</h3>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Subject:</strong> {}</p>\
         <p><strong>Message:</strong> {}</p>{}",
        payload.name, payload.email, payload.subject, payload.message, phone_line
    );

    state
        .mailer
        .send(
            &state.config.support_email,
            &format!("New Contact Form: {}", payload.subject),
            html_body,
        )
        .await?;

    if let (Some(phone), Some(carrier)) = (&payload.phone_number, &payload.carrier) {
        if let Some((_, gateway)) = CARRIER_GATEWAYS
            .iter()
            .find(|(name, _)| *name == carrier.as_str())
        {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            let preview: String = payload.message.chars().take(SMS_PREVIEW_CHARS).collect();

            state
                .mailer
                .send(
                    &format!("{}@{}", digits, gateway),
                    "New contact form submission",
                    format!("New message from {}: {}...", payload.name, preview),
                )
                .await?;
        }
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Message sent successfully"
    })))
}
