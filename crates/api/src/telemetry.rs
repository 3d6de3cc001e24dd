use std::fmt::{self, Write as _};

use serde_json::json;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DISCORD_MAX_CONTENT: usize = 1900;
/// Pending webhook messages; anything beyond is dropped.
const DISCORD_QUEUE: usize = 256;

/// Installs the global subscriber: env filter, stdout formatter and, when a
/// webhook is configured, a layer forwarding warnings and errors to Discord.
pub fn init(discord_webhook_url: Option<String>) {
    let discord = discord_webhook_url.map(spawn_discord_layer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(discord)
        .init();
}

/// Forwards WARN and ERROR events to a channel drained by a webhook task.
pub struct DiscordLayer {
    sender: mpsc::Sender<String>,
}

impl DiscordLayer {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }
}

fn spawn_discord_layer(webhook_url: String) -> DiscordLayer {
    let (sender, mut receiver) = mpsc::channel::<String>(DISCORD_QUEUE);
    let client = reqwest::Client::new();

    tokio::spawn(async move {
        while let Some(content) = receiver.recv().await {
            let result = client
                .post(&webhook_url)
                .json(&json!({ "content": content }))
                .send()
                .await;
            // Below WARN so the failure is not fed back into this layer.
            if let Err(e) = result {
                tracing::debug!("Discord webhook delivery failed: {e}");
            }
        }
    });

    DiscordLayer::new(sender)
}

impl<S: Subscriber> Layer<S> for DiscordLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let content = format_message(
            *metadata.level(),
            metadata.target(),
            &visitor.message,
            &visitor.fields,
        );
        let _ = self.sender.try_send(content);
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }
}

fn format_message(level: Level, target: &str, message: &str, fields: &[(String, String)]) -> String {
    let icon = if level == Level::ERROR { "🔴" } else { "🟠" };
    let mut content = format!("{icon} **{level}** `{target}`\n{message}");
    for (name, value) in fields {
        let _ = write!(content, "\n> {name}: {value}");
    }

    if content.chars().count() > DISCORD_MAX_CONTENT {
        content = content.chars().take(DISCORD_MAX_CONTENT).collect();
        content.push('…');
    }
    content
}
