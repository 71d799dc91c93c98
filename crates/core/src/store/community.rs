//! Community posts and staff notifications.

use super::EntityStore;
use crate::access::Role;
use crate::constants::{COMMENT_ID_PREFIX, MAX_ID_ATTEMPTS};
use crate::models::{
    optional_text, Comment, Notification, NotificationDraft, NotificationStatus, Post, PostDraft,
    Record,
};
use crate::{StoreError, StoreResult};
use chrono::Utc;
use hms_ids::EntityId;
use hms_types::NonEmptyText;

impl EntityStore {
    /// Posts, newest first.
    pub fn posts(&self) -> &[Record<Post>] {
        self.posts.records()
    }

    pub fn post(&self, id: &EntityId) -> StoreResult<&Record<Post>> {
        self.require(id)
    }

    /// Publishes a post stamped with the current time.
    pub fn publish_post(&mut self, draft: PostDraft) -> StoreResult<Record<Post>> {
        self.insert(Post {
            title: draft.title,
            content: draft.content,
            category: draft.category,
            author: optional_text(draft.author),
            created_at: Utc::now(),
            likes: 0,
            comments: Vec::new(),
        })
    }

    /// Rewrites the text of a post, keeping its timestamp, likes and comments.
    pub fn edit_post(&mut self, id: &EntityId, draft: PostDraft) -> StoreResult<Record<Post>> {
        self.update(id, |post: &mut Post| {
            post.title = draft.title;
            post.content = draft.content;
            post.category = draft.category;
            post.author = optional_text(draft.author);
            Ok(())
        })
    }

    pub fn delete_post(&mut self, id: &EntityId) -> StoreResult<Record<Post>> {
        self.remove(id)
    }

    pub fn like_post(&mut self, id: &EntityId) -> StoreResult<Record<Post>> {
        self.update(id, |post: &mut Post| {
            post.likes = post.likes.saturating_add(1);
            Ok(())
        })
    }

    /// Appends a comment and returns it.
    pub fn comment_on_post(
        &mut self,
        post_id: &EntityId,
        author_name: NonEmptyText,
        author_role: Role,
        text: NonEmptyText,
    ) -> StoreResult<Comment> {
        let post = self.require::<Post>(post_id)?;
        let comment = Comment {
            id: allocate_comment_id(&post.fields)?,
            text,
            author_name,
            author_role,
            timestamp: Utc::now(),
        };

        let pushed = comment.clone();
        self.update(post_id, move |post: &mut Post| {
            post.comments.push(pushed);
            Ok(())
        })?;
        Ok(comment)
    }

    pub fn delete_comment(
        &mut self,
        post_id: &EntityId,
        comment_id: &EntityId,
    ) -> StoreResult<Record<Post>> {
        self.update(post_id, |post: &mut Post| {
            let before = post.comments.len();
            post.comments.retain(|c| &c.id != comment_id);
            if post.comments.len() == before {
                return Err(StoreError::InvalidInput(format!(
                    "post {} has no comment {}",
                    post_id, comment_id
                )));
            }
            Ok(())
        })
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> &[Record<Notification>] {
        self.notifications.records()
    }

    pub fn notification(&self, id: &EntityId) -> StoreResult<&Record<Notification>> {
        self.require(id)
    }

    /// Sends a notification. It starts `pending` and is stamped with the current time.
    pub fn send_notification(
        &mut self,
        draft: NotificationDraft,
    ) -> StoreResult<Record<Notification>> {
        self.insert(Notification {
            kind: draft.kind,
            from: draft.from,
            to: draft.to,
            message: draft.message,
            description: optional_text(draft.description),
            status: NotificationStatus::Pending,
            sent_at: Utc::now(),
        })
    }

    /// Approves or rejects a notification.
    pub fn set_notification_status(
        &mut self,
        id: &EntityId,
        status: NotificationStatus,
    ) -> StoreResult<Record<Notification>> {
        self.update(id, |n: &mut Notification| {
            n.status = status;
            Ok(())
        })
    }

    pub fn delete_notification(&mut self, id: &EntityId) -> StoreResult<Record<Notification>> {
        self.remove(id)
    }
}

fn allocate_comment_id(post: &Post) -> StoreResult<EntityId> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = EntityId::generate(COMMENT_ID_PREFIX)?;
        if post.comments.iter().all(|c| c.id != id) {
            return Ok(id);
        }
    }
    Err(StoreError::InvalidInput(
        "could not allocate an unused comment identifier".into(),
    ))
}

#[cfg(test)]
mod tests {
    use crate::access::Role;
    use crate::models::{NotificationDraft, NotificationStatus, PostDraft};
    use crate::store::tests::{demo_store, id};
    use crate::StoreError;
    use hms_types::NonEmptyText;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn draft() -> PostDraft {
        PostDraft {
            title: text("Sleep hygiene"),
            content: text("Keep a regular bedtime."),
            category: text("Mental Health"),
            author: Some("  ".into()),
        }
    }

    #[test]
    fn test_publish_post_goes_first_with_no_likes() {
        let mut store = demo_store();
        let post = store.publish_post(draft()).unwrap();

        assert!(post.id.has_prefix("POST"));
        assert_eq!(post.fields.likes, 0);
        assert_eq!(post.fields.author, None);
        assert_eq!(store.posts()[0].id, post.id);
    }

    #[test]
    fn test_edit_post_keeps_likes() {
        let mut store = demo_store();
        let mut edited = draft();
        edited.author = Some("Chief".into());

        let post = store.edit_post(&id("POST-002"), edited).unwrap();
        assert_eq!(post.fields.likes, 5);
        assert_eq!(post.fields.title.as_str(), "Sleep hygiene");
        assert_eq!(post.fields.author.as_deref(), Some("Chief"));
    }

    #[test]
    fn test_like_and_comment_round() {
        let mut store = demo_store();
        store.like_post(&id("POST-001")).unwrap();
        let comment = store
            .comment_on_post(&id("POST-001"), text("Front desk"), Role::Clerk, text("Great tips"))
            .unwrap();

        let post = store.post(&id("POST-001")).unwrap();
        assert_eq!(post.fields.likes, 4);
        assert_eq!(post.fields.comments.len(), 1);
        assert!(comment.id.has_prefix("C"));

        store.delete_comment(&id("POST-001"), &comment.id).unwrap();
        assert!(store.post(&id("POST-001")).unwrap().fields.comments.is_empty());
    }

    #[test]
    fn test_delete_missing_comment_is_invalid() {
        let mut store = demo_store();
        assert!(matches!(
            store.delete_comment(&id("POST-001"), &id("C-NOPE")),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_notification_lifecycle() {
        let mut store = demo_store();
        let sent = store
            .send_notification(NotificationDraft {
                kind: text("Override Request"),
                from: text("Nurse Hanan"),
                to: text("Dr. Omar Khaled"),
                message: text("Dosage review for P-001"),
                description: None,
            })
            .unwrap();
        assert_eq!(sent.fields.status, NotificationStatus::Pending);
        assert_eq!(store.notifications()[0].id, sent.id);

        let approved = store
            .set_notification_status(&sent.id, NotificationStatus::Approved)
            .unwrap();
        assert_eq!(approved.fields.status, NotificationStatus::Approved);

        store.delete_notification(&sent.id).unwrap();
        assert_eq!(store.notifications().len(), 3);
    }
}
