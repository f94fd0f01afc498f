use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::post_statuses::PostStatus,
    infra::db::postgres::schema::social_posts,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = social_posts)]
pub struct SocialPostEntity {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub content: String,
    pub link_url: Option<String>,
    pub media_url: Option<String>,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub external_post_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialPostEntity {
    pub fn post_status(&self) -> PostStatus {
        PostStatus::from_str(&self.status)
    }

    /// Selected by a polling pass run at `now`.
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.post_status() == PostStatus::Scheduled && self.scheduled_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(status: PostStatus, scheduled_at: DateTime<Utc>) -> SocialPostEntity {
        SocialPostEntity {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider: "facebook".to_string(),
            content: "hello".to_string(),
            link_url: None,
            media_url: None,
            status: status.to_string(),
            scheduled_at,
            claimed_at: None,
            published_at: None,
            external_post_id: None,
            error_message: None,
            created_at: scheduled_at,
            updated_at: scheduled_at,
        }
    }

    #[test]
    fn future_posts_are_not_due() {
        let now = Utc::now();
        assert!(!post(PostStatus::Scheduled, now + Duration::seconds(1)).is_due_at(now));
        assert!(post(PostStatus::Scheduled, now).is_due_at(now));
    }

    #[test]
    fn failed_posts_are_never_picked_up_again() {
        let now = Utc::now();
        let past = now - Duration::hours(2);
        assert!(!post(PostStatus::Failed, past).is_due_at(now));
        assert!(!post(PostStatus::Publishing, past).is_due_at(now));
        assert!(!post(PostStatus::Draft, past).is_due_at(now));
    }
}
