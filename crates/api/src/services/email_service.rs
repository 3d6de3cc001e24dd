use html_escape::encode_text;
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {body}")]
    ApiError { status: u16, body: String },
}

#[derive(Clone)]
pub struct EmailConfig {
    pub scw_secret_key: String,
    pub scw_project_id: String,
    pub scw_region: String,
    pub sender_email: String,
    pub sender_name: String,
    pub frontend_base_url: String,
}

impl EmailConfig {
    /// `None` when the transactional email credentials are not configured.
    pub fn from_env() -> Option<Self> {
        let scw_secret_key = std::env::var("SCW_SECRET_KEY").ok()?;
        let scw_project_id = std::env::var("SCW_DEFAULT_PROJECT_ID").ok()?;
        let sender_email = std::env::var("SCW_SENDER_EMAIL").ok()?;

        Some(Self {
            scw_secret_key,
            scw_project_id,
            scw_region: std::env::var("SCW_REGION").unwrap_or_else(|_| "fr-par".to_string()),
            sender_email,
            sender_name: std::env::var("SCW_SENDER_NAME")
                .unwrap_or_else(|_| "Jogging Tour".to_string()),
            frontend_base_url: std::env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Nl,
    En,
}

impl Locale {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.get(..2).unwrap_or("nl") {
            "en" => Self::En,
            _ => Self::Nl,
        }
    }
}

struct Texts {
    hi: &'static str,
    reset_subject: &'static str,
    reset_body: &'static str,
    reset_cta: &'static str,
    reset_disclaimer: &'static str,
    confirm_subject: &'static str,
    confirm_body: &'static str,
    confirm_cta: &'static str,
}

fn texts(locale: Locale) -> &'static Texts {
    match locale {
        Locale::Nl => &TEXTS_NL,
        Locale::En => &TEXTS_EN,
    }
}

static TEXTS_NL: Texts = Texts {
    hi: "Hallo",
    reset_subject: "Wachtwoord opnieuw instellen",
    reset_body: "We ontvingen een aanvraag om je wachtwoord opnieuw in te stellen. Gebruik de knop hieronder om een nieuw wachtwoord te kiezen:",
    reset_cta: "Nieuw wachtwoord kiezen",
    reset_disclaimer: "Deze link is 1 uur geldig. Heb je niets aangevraagd, dan mag je deze e-mail negeren.",
    confirm_subject: "Bevestig je e-mailadres",
    confirm_body: "Bevestig je e-mailadres om je inschrijvingen en uitslagen te kunnen volgen:",
    confirm_cta: "E-mailadres bevestigen",
};

static TEXTS_EN: Texts = Texts {
    hi: "Hi",
    reset_subject: "Reset your password",
    reset_body: "We received a request to reset your password. Use the button below to choose a new one:",
    reset_cta: "Choose a new password",
    reset_disclaimer: "This link expires in 1 hour. If you did not request a reset you can ignore this email.",
    confirm_subject: "Confirm your email address",
    confirm_body: "Confirm your email address to follow your registrations and results:",
    confirm_cta: "Confirm email address",
};

fn layout(heading: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{heading}</title></head>
<body style="margin:0;padding:32px 16px;background-color:#f4f6f8;font-family:Arial,Helvetica,sans-serif;color:#1f2933;">
<table role="presentation" width="560" cellpadding="0" cellspacing="0" border="0" style="max-width:560px;margin:0 auto;background-color:#ffffff;border-radius:6px;">
<tr><td style="padding:32px 40px 8px;"><h1 style="margin:0;font-size:22px;color:#0b7a3b;">{heading}</h1></td></tr>
<tr><td style="padding:16px 40px 32px;">{body_html}</td></tr>
</table>
</body>
</html>"#
    )
}

fn paragraph(text: &str) -> String {
    format!(r#"<p style="margin:0 0 16px;font-size:15px;line-height:1.6;">{text}</p>"#)
}

fn button(href: &str, label: &str) -> String {
    format!(
        r#"<p style="margin:8px 0 20px;"><a href="{href}" target="_blank" style="display:inline-block;padding:12px 32px;background-color:#0b7a3b;color:#ffffff;text-decoration:none;border-radius:4px;font-weight:bold;">{label}</a></p>"#
    )
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn reset_link(&self, email: &str, token: &str) -> String {
        format!(
            "{}/reset-password?email={}&token={}",
            self.config.frontend_base_url,
            encode_query(email),
            token
        )
    }

    pub fn confirm_link(&self, token: &str) -> String {
        format!("{}/confirm-email?token={}", self.config.frontend_base_url, token)
    }

    async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), EmailError> {
        let url = format!(
            "https://api.scaleway.com/transactional-email/v1alpha1/regions/{}/emails",
            self.config.scw_region
        );

        let body = json!({
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name,
            },
            "to": [{
                "email": to_email,
                "name": to_name,
            }],
            "subject": subject,
            "html": html,
            "text": text,
            "project_id": self.config.scw_project_id,
        });

        let response = self
            .client
            .post(&url)
            .header("X-Auth-Token", &self.config.scw_secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::ApiError { status, body });
        }

        info!("Email sent to {} ({})", to_email, subject);
        Ok(())
    }

    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
        locale: Locale,
    ) -> Result<(), EmailError> {
        let t = texts(locale);
        let link = self.reset_link(to_email, reset_token);
        let (html, text) = render(
            t.hi,
            to_name,
            t.reset_subject,
            t.reset_body,
            t.reset_cta,
            &link,
            Some(t.reset_disclaimer),
        );
        self.send_email(to_email, to_name, t.reset_subject, &html, &text)
            .await
    }

    pub async fn send_email_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
        confirm_token: &str,
        locale: Locale,
    ) -> Result<(), EmailError> {
        let t = texts(locale);
        let link = self.confirm_link(confirm_token);
        let (html, text) = render(
            t.hi,
            to_name,
            t.confirm_subject,
            t.confirm_body,
            t.confirm_cta,
            &link,
            None,
        );
        self.send_email(to_email, to_name, t.confirm_subject, &html, &text)
            .await
    }
}

fn render(
    hi: &str,
    to_name: &str,
    heading: &str,
    body: &str,
    cta: &str,
    link: &str,
    disclaimer: Option<&str>,
) -> (String, String) {
    let safe_name = encode_text(to_name);
    let safe_link = encode_text(link);

    let mut body_html = format!(
        "{}{}{}",
        paragraph(&format!("{} {},", hi, safe_name)),
        paragraph(body),
        button(&safe_link, cta),
    );
    if let Some(disclaimer) = disclaimer {
        body_html.push_str(&paragraph(disclaimer));
    }

    let mut text = format!("{} {},\n\n{}\n\n{}: {}", hi, to_name, body, cta, link);
    if let Some(disclaimer) = disclaimer {
        text.push_str("\n\n");
        text.push_str(disclaimer);
    }

    (layout(heading, &body_html), text)
}

fn encode_query(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            other => format!("%{:02X}", other),
        })
        .collect()
}
