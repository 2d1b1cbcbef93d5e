//! User-facing notifications.
//!
//! Cart operations never return errors to their callers. Instead, every
//! rejected or failed operation emits one [`Notification`] through a
//! [`Notifier`], which the UI layer renders as a transient toast.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Language used for notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    En,
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl Locale {
    /// BCP 47 tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::PtBr => "pt-BR",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Self::En),
            "pt" | "pt-br" => Ok(Self::PtBr),
            other => Err(format!("unsupported locale '{other}' (expected en or pt-BR)")),
        }
    }
}

/// How prominently the UI should present a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The requested amount exceeds available stock.
    QuantityUnavailable,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl NotificationKind {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::QuantityUnavailable => Severity::Warning,
            Self::AddFailed | Self::RemoveFailed | Self::UpdateFailed => Severity::Error,
        }
    }

    /// Literal message text in the given language.
    #[must_use]
    pub const fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::QuantityUnavailable, Locale::En) => "Requested quantity is out of stock",
            (Self::QuantityUnavailable, Locale::PtBr) => "Quantidade solicitada fora de estoque",
            (Self::AddFailed, Locale::En) => "Failed to add product",
            (Self::AddFailed, Locale::PtBr) => "Erro na adição do produto",
            (Self::RemoveFailed, Locale::En) => "Failed to remove product",
            (Self::RemoveFailed, Locale::PtBr) => "Erro na remoção do produto",
            (Self::UpdateFailed, Locale::En) => "Failed to update product quantity",
            (Self::UpdateFailed, Locale::PtBr) => "Erro na alteração de quantidade do produto",
        }
    }
}

/// A message for the user-facing notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, locale: Locale) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: kind.message(locale).to_string(),
        }
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that forwards to an unbounded channel read by the UI layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.sender.send(notification) {
            debug!(kind = ?e.0.kind, "Notification dropped, receiver closed");
        }
    }
}

/// Notifier that only logs. Useful when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Warning => warn!(
                kind = ?notification.kind,
                message = %notification.message,
                "Cart notification"
            ),
            Severity::Error => error!(
                kind = ?notification.kind,
                message = %notification.message,
                "Cart notification"
            ),
        }
    }
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}
