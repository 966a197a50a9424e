//! Worker events and the host capabilities they reach
//!
//! Apart from install, activate and fetch these events carry no caching
//! logic: they decode a payload and call a host capability.

use crate::error::Result;
use crate::http::Request;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sync tag that triggers a background sync
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Notification action that opens the dashboard
pub const EXPLORE_ACTION: &str = "explore";

/// Notification action that only dismisses
pub const CLOSE_ACTION: &str = "close";

/// Page opened by the explore action
pub const DASHBOARD_URL: &str = "/";

pub const NOTIFICATION_ICON: &str = "/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/badge-72x72.png";
pub const NOTIFICATION_VIBRATION: [u32; 3] = [100, 50, 100];

/// Everything the host can deliver to the worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    /// Raw push body, if the push carried one
    Push(Option<String>),
    NotificationClick {
        /// Title of the clicked notification
        title: String,
        /// Action button pressed; `None` for a click on the body
        action: Option<String>,
    },
    /// Structured message posted by a page
    Message(serde_json::Value),
}

/// JSON body of a push message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl PushPayload {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Auxiliary data attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Options passed to `Notifier::show_notification`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl NotificationOptions {
    /// Options for a dashboard push notification
    pub fn for_push(payload: &PushPayload) -> Self {
        Self {
            body: payload.body.clone(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
            vibrate: NOTIFICATION_VIBRATION.to_vec(),
            data: NotificationData {
                date_of_arrival: Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction {
                    action: EXPLORE_ACTION.to_string(),
                    title: "View Dashboard".to_string(),
                    icon: NOTIFICATION_ICON.to_string(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: "Close".to_string(),
                    icon: NOTIFICATION_ICON.to_string(),
                },
            ],
        }
    }
}

/// Message types a page can post to the worker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Activate a waiting worker without waiting for pages to close
    SkipWaiting,
}

impl WorkerMessage {
    /// Decode a posted message; anything unrecognized yields `None`
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Host notification display
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show_notification(&self, title: &str, options: NotificationOptions) -> Result<()>;

    async fn close_notification(&self, title: &str) -> Result<()>;
}

/// Host window control
#[async_trait]
pub trait ClientControl: Send + Sync {
    async fn open_window(&self, url: &str) -> Result<()>;
}

/// `Notifier` and `ClientControl` that only log; for headless hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHost;

#[async_trait]
impl Notifier for LoggingHost {
    async fn show_notification(&self, title: &str, options: NotificationOptions) -> Result<()> {
        info!("Notification: {} - {}", title, options.body);
        Ok(())
    }

    async fn close_notification(&self, title: &str) -> Result<()> {
        info!("Notification closed: {}", title);
        Ok(())
    }
}

#[async_trait]
impl ClientControl for LoggingHost {
    async fn open_window(&self, url: &str) -> Result<()> {
        info!("Opening window: {}", url);
        Ok(())
    }
}
