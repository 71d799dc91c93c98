//! Community posts and staff notifications. Neither takes part in scheduling.

use super::{Entity, EntityKind};
use crate::access::Role;
use chrono::{DateTime, Utc};
use hms_ids::EntityId;
use hms_types::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub text: NonEmptyText,
    pub author_name: NonEmptyText,
    pub author_role: Role,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: NonEmptyText,
    pub content: NonEmptyText,
    pub category: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Post;
}

/// The author-supplied part of a post. Timestamps, likes and comments are owned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: NonEmptyText,
    pub content: NonEmptyText,
    pub category: NonEmptyText,
    #[serde(default)]
    pub author: Option<String>,
}

labelled_enum! {
    pub enum NotificationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl Default for NotificationStatus {
    fn default() -> Self {
        NotificationStatus::Pending
    }
}

/// A request routed between staff (override requests, transfer requests, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NonEmptyText,
    pub from: NonEmptyText,
    pub to: NonEmptyText,
    pub message: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: NotificationStatus,
    pub sent_at: DateTime<Utc>,
}

impl Entity for Notification {
    const KIND: EntityKind = EntityKind::Notification;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    #[serde(rename = "type")]
    pub kind: NonEmptyText,
    pub from: NonEmptyText,
    pub to: NonEmptyText,
    pub message: NonEmptyText,
    #[serde(default)]
    pub description: Option<String>,
}
