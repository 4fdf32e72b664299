//! Per-provider alert templates.
//!
//! Each provider has a fixed firing and a fixed resolved template. Both share
//! the same rules: label lines are emitted only when the label is present, and
//! alerts with any other status render to an empty string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Alert, AlertStatus};

/// Telegram's limit on the text of a single message.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Discord's limit on the content of a single message.
pub const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

const DISCORD_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Renders alerts into provider text.
pub trait Renderer {
    /// Renders a single alert. Returns an empty string for statuses that are
    /// not rendered.
    fn render(&self, alert: &Alert) -> String;

    /// Text placed between consecutive alerts of one message.
    fn separator(&self) -> &str {
        "\n\n"
    }

    /// Renders several alerts as one message body, skipping empty renders.
    fn render_all(&self, alerts: &[Alert]) -> String {
        let parts: Vec<String> = alerts
            .iter()
            .map(|a| self.render(a))
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(self.separator())
    }
}

/// A chat destination with its own template and size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Telegram Bot API, HTML parse mode.
    Telegram,
    /// Discord, Markdown content.
    Discord,
}

impl Provider {
    /// Returns the provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
        }
    }

    /// Maximum message length, in characters.
    #[must_use]
    pub const fn max_message_len(&self) -> usize {
        match self {
            Self::Telegram => TELEGRAM_MAX_MESSAGE_LEN,
            Self::Discord => DISCORD_MAX_MESSAGE_LEN,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Renderer for Provider {
    fn render(&self, alert: &Alert) -> String {
        match (self, alert.status) {
            (Self::Telegram, AlertStatus::Firing) => telegram_firing(alert),
            (Self::Telegram, AlertStatus::Resolved) => telegram_resolved(alert),
            (Self::Discord, AlertStatus::Firing) => discord_firing(alert),
            (Self::Discord, AlertStatus::Resolved) => discord_resolved(alert),
            (_, AlertStatus::Unknown) => String::new(),
        }
    }
}

/// Formats uptime the way every template shows it.
#[must_use]
pub fn format_uptime(alert: &Alert) -> String {
    format!("{:.2}", alert.uptime_years())
}

fn telegram_firing(alert: &Alert) -> String {
    let mut out = String::from("❗️❗️❗️❗️❗️ CẢNH BÁO ❗️❗️❗️❗️❗️\n\n");
    out.push_str(&format!("🚨 Vấn đề: {} 🚨\n", escape_html(alert.summary())));
    out.push_str(&format!(
        "<b>Thời gian hoạt động = </b>{} năm\n\n",
        format_uptime(alert)
    ));
    out.push_str("<b>Thông tin node:</b>");
    push_telegram_labels(&mut out, alert);
    out
}

fn telegram_resolved(alert: &Alert) -> String {
    let mut out = String::from("🤟🤟🤟 Đã giải quyết xong 🤘🤘🤘\n\n");
    out.push_str(&format!(
        "🔧🛠️✨ Vấn đề: {} 🔩⚙️🔨\n\n",
        escape_html(alert.summary())
    ));
    out.push_str("<b>Thông tin nodes:</b>");
    push_telegram_labels(&mut out, alert);
    out
}

fn push_telegram_labels(out: &mut String, alert: &Alert) {
    if let Some(instance) = alert.instance() {
        out.push_str(&format!("\n- Node = {}", escape_html(instance)));
    }
    if let Some(device) = alert.device() {
        out.push_str(&format!("\n- Device = {}", escape_html(device)));
    }
}

fn discord_firing(alert: &Alert) -> String {
    let mut out = String::from("# ❗️❗️❗️ CẢNH BÁO HỆ THỐNG ❗️❗️❗️\n\n");
    out.push_str(&format!("> 🚨 **Vấn đề:** {}\n", alert.summary()));
    out.push_str(&format!(
        "> ⏳ **Thời gian hoạt động:** {} năm\n",
        format_uptime(alert)
    ));
    out.push_str("### 🖥️ Thông tin node:");
    push_discord_labels(&mut out, alert);
    out.push('\n');
    out.push_str(DISCORD_RULE);
    out
}

fn discord_resolved(alert: &Alert) -> String {
    let mut out = String::from("# 🤟 ĐÃ GIẢI QUYẾT 🤘\n\n");
    out.push_str(&format!("> 🔧🛠️✨ **Vấn đề:** {}\n", alert.summary()));
    out.push_str("### 🖥️ Thông tin node:");
    push_discord_labels(&mut out, alert);
    out.push('\n');
    out.push_str(DISCORD_RULE);
    out
}

fn push_discord_labels(out: &mut String, alert: &Alert) {
    if let Some(instance) = alert.instance() {
        out.push_str(&format!("\n> 🔹 **Node:** {instance}"));
    }
    if let Some(device) = alert.device() {
        out.push_str(&format!("\n> 🔸 **Device:** {device}"));
    }
}

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
