use super::*;
use crates::domain::{
    entities::social_accounts::SocialAccountEntity,
    repositories::{
        notifications::MockNotificationRepository, social_accounts::MockSocialAccountRepository,
        social_posts::MockSocialPostRepository, social_publisher::MockSocialPublisher,
    },
};
use mockall::predicate::{always, eq};
use uuid::Uuid;

fn post(user_id: Uuid, scheduled_at: DateTime<Utc>) -> SocialPostEntity {
    SocialPostEntity {
        id: Uuid::new_v4(),
        team_id: Uuid::new_v4(),
        user_id,
        provider: "facebook".to_string(),
        content: "Hello".to_string(),
        link_url: None,
        media_url: None,
        status: "scheduled".to_string(),
        scheduled_at,
        claimed_at: None,
        published_at: None,
        external_post_id: None,
        error_message: None,
        created_at: scheduled_at,
        updated_at: scheduled_at,
    }
}

fn account(user_id: Uuid, token_expires_at: Option<DateTime<Utc>>) -> SocialAccountEntity {
    let now = Utc::now();
    SocialAccountEntity {
        id: Uuid::new_v4(),
        team_id: Uuid::new_v4(),
        user_id,
        provider: "facebook".to_string(),
        external_account_id: "page-1".to_string(),
        access_token: "token".to_string(),
        token_expires_at,
        created_at: now,
        updated_at: now,
    }
}

fn facebook_publisher() -> MockSocialPublisher {
    let mut publisher = MockSocialPublisher::new();
    publisher
        .expect_provider()
        .return_const(SocialProvider::Facebook);
    publisher
}

fn usecase(
    posts: MockSocialPostRepository,
    accounts: MockSocialAccountRepository,
    notifications: MockNotificationRepository,
    publisher: MockSocialPublisher,
) -> PublishScheduledPostsUseCase {
    PublishScheduledPostsUseCase::new(
        Arc::new(posts),
        Arc::new(accounts),
        Arc::new(notifications),
        vec![Arc::new(publisher)],
    )
}

fn params(now: DateTime<Utc>) -> PublishPostsParams {
    PublishPostsParams {
        provider: SocialProvider::Facebook,
        user_id: None,
        now,
        limit: Some(50),
        dry_run: false,
    }
}

#[tokio::test]
async fn publishes_claimed_post_and_records_external_id() {
    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let due = post(user_id, now - Duration::minutes(5));
    let due_id = due.id;

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .with(eq(SocialProvider::Facebook), eq(None), eq(now), eq(Some(50)))
        .returning(move |_, _, _, _| Ok(vec![due.clone()]))
        .times(1);
    posts
        .expect_claim_post()
        .withf(move |post_id, claimed_at| *post_id == due_id && *claimed_at >= now)
        .returning(|_, _| Ok(true))
        .times(1);
    posts
        .expect_mark_published()
        .with(eq(due_id), eq("fb_123".to_string()), always())
        .returning(|_, _, _| Ok(true))
        .times(1);
    posts.expect_mark_failed().never();

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .with(eq(user_id), eq(SocialProvider::Facebook))
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut notifications = MockNotificationRepository::new();
    notifications.expect_create().never();

    let mut publisher = facebook_publisher();
    publisher.expect_publish().times(1).returning(|_, _| {
        Ok(PublishedPost {
            external_post_id: "fb_123".to_string(),
        })
    });

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.scanned, 1);
    assert_eq!(result.claimed, 1);
    assert_eq!(result.published, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(result.published_ids, vec![due_id]);
}

#[tokio::test]
async fn post_claimed_elsewhere_is_skipped() {
    let now = Utc::now();
    let due = post(Uuid::new_v4(), now);

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts.expect_claim_post().returning(|_, _| Ok(false));
    posts.expect_mark_published().never();
    posts.expect_mark_failed().never();

    let mut accounts = MockSocialAccountRepository::new();
    accounts.expect_find_account().never();

    let mut publisher = facebook_publisher();
    publisher.expect_publish().never();

    let result = usecase(posts, accounts, MockNotificationRepository::new(), publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.skipped_already_claimed, 1);
    assert_eq!(result.claimed, 0);
    assert_eq!(result.published, 0);
}

#[tokio::test]
async fn failure_marks_post_failed_notifies_and_continues() {
    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let first = post(user_id, now - Duration::minutes(10));
    let second = post(user_id, now - Duration::minutes(1));
    let (first_id, second_id) = (first.id, second.id);
    let first_team = first.team_id;

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![first.clone(), second.clone()]));
    posts.expect_claim_post().times(2).returning(|_, _| Ok(true));
    posts
        .expect_mark_failed()
        .withf(move |post_id, message| {
            *post_id == first_id && message.contains("(#200) Permissions error")
        })
        .times(1)
        .returning(|_, _| Ok(true));
    posts
        .expect_mark_published()
        .with(eq(second_id), always(), always())
        .times(1)
        .returning(|_, _, _| Ok(true));

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(move |notification| {
            notification.user_id == user_id
                && notification.team_id == Some(first_team)
                && notification.kind == SOCIAL_POST_FAILED_KIND
                && !notification.is_read
        })
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().times(2).returning(move |_, post| {
        if post.id == first_id {
            Err(PublishError::Api {
                provider: SocialProvider::Facebook,
                status: Some(403),
                message: "(#200) Permissions error".to_string(),
            })
        } else {
            Ok(PublishedPost {
                external_post_id: "fb_2".to_string(),
            })
        }
    });

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(result.published, 1);
    assert_eq!(result.failed_ids, vec![first_id]);
    assert_eq!(result.published_ids, vec![second_id]);
}

#[tokio::test]
async fn missing_credential_fails_without_calling_provider() {
    let now = Utc::now();
    let due = post(Uuid::new_v4(), now);
    let due_id = due.id;

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts.expect_claim_post().returning(|_, _| Ok(true));
    posts
        .expect_mark_failed()
        .withf(move |post_id, message| *post_id == due_id && message.contains("no connected"))
        .times(1)
        .returning(|_, _| Ok(true));

    let mut accounts = MockSocialAccountRepository::new();
    accounts.expect_find_account().returning(|_, _| Ok(None));

    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().never();

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
}

#[tokio::test]
async fn expired_credential_fails_without_calling_provider() {
    let now = Utc::now();
    let due = post(Uuid::new_v4(), now);

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts.expect_claim_post().returning(|_, _| Ok(true));
    posts
        .expect_mark_failed()
        .withf(|_, message| message.contains("expired"))
        .times(1)
        .returning(|_, _| Ok(true));

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, Some(now - Duration::hours(1))))));

    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .returning(|_| Ok(Uuid::new_v4()));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().never();

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
}

#[tokio::test]
async fn dry_run_lists_candidates_without_claiming() {
    let now = Utc::now();
    let due = post(Uuid::new_v4(), now);
    let due_id = due.id;

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts.expect_claim_post().never();

    let mut publisher = facebook_publisher();
    publisher.expect_publish().never();

    let result = usecase(
        posts,
        MockSocialAccountRepository::new(),
        MockNotificationRepository::new(),
        publisher,
    )
    .run(PublishPostsParams {
        dry_run: true,
        ..params(now)
    })
    .await
    .unwrap();

    assert_eq!(result.scanned, 1);
    assert_eq!(result.candidate_ids, vec![due_id]);
    assert_eq!(result.claimed, 0);
}

#[tokio::test]
async fn non_positive_limit_means_no_limit() {
    let now = Utc::now();

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .with(always(), always(), always(), eq(None))
        .times(1)
        .returning(|_, _, _, _| Ok(vec![]));

    let result = usecase(
        posts,
        MockSocialAccountRepository::new(),
        MockNotificationRepository::new(),
        facebook_publisher(),
    )
    .run(PublishPostsParams {
        limit: Some(0),
        ..params(now)
    })
    .await
    .unwrap();

    assert_eq!(result.scanned, 0);
}

#[tokio::test]
async fn provider_without_publisher_is_an_error() {
    let result = usecase(
        MockSocialPostRepository::new(),
        MockSocialAccountRepository::new(),
        MockNotificationRepository::new(),
        facebook_publisher(),
    )
    .run(PublishPostsParams {
        provider: SocialProvider::Instagram,
        ..params(Utc::now())
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn dispatch_runs_one_pass_per_connected_user() {
    let now = Utc::now();
    let healthy_user = Uuid::new_v4();
    let broken_user = Uuid::new_v4();
    let due = post(healthy_user, now);

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_list_connected_user_ids()
        .with(eq(SocialProvider::Facebook))
        .returning(move |_| Ok(vec![healthy_user, broken_user]));
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .with(always(), eq(Some(healthy_user)), eq(now), eq(Some(10)))
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts
        .expect_list_due_posts()
        .with(always(), eq(Some(broken_user)), always(), always())
        .returning(|_, _, _, _| Err(anyhow!("connection reset")));
    posts.expect_claim_post().returning(|_, _| Ok(true));
    posts
        .expect_mark_published()
        .returning(|_, _, _| Ok(true));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().returning(|_, _| {
        Ok(PublishedPost {
            external_post_id: "fb_9".to_string(),
        })
    });

    let result = usecase(posts, accounts, MockNotificationRepository::new(), publisher)
        .dispatch(SocialProvider::Facebook, now, Some(10))
        .await
        .unwrap();

    assert_eq!(result.users, 2);
    assert_eq!(result.users_failed, 1);
    assert_eq!(result.totals.published, 1);
}

#[tokio::test]
async fn stale_claims_are_failed_and_reported() {
    let now = Utc::now();
    let mut stuck = post(Uuid::new_v4(), now - Duration::hours(1));
    stuck.status = "failed".to_string();
    stuck.claimed_at = Some(now - Duration::minutes(30));

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_fail_stale_claims()
        .with(
            eq(SocialProvider::Facebook),
            eq(now - Duration::minutes(15)),
            eq(STALE_CLAIM_MESSAGE.to_string()),
        )
        .times(1)
        .returning(move |_, _, _| Ok(vec![stuck.clone()]));

    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_create()
        .withf(|notification| notification.body == STALE_CLAIM_MESSAGE)
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let failed = usecase(
        posts,
        MockSocialAccountRepository::new(),
        notifications,
        facebook_publisher(),
    )
    .fail_stale_claims(SocialProvider::Facebook, now, Duration::minutes(15))
    .await
    .unwrap();

    assert_eq!(failed, 1);
}

#[tokio::test]
async fn claims_are_stamped_with_the_claim_time_not_the_pass_start() {
    let pass_started = Utc::now() - Duration::minutes(20);
    let due = post(Uuid::new_v4(), pass_started - Duration::minutes(1));
    let before_run = Utc::now();

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts
        .expect_claim_post()
        .withf(move |_, claimed_at| *claimed_at >= before_run)
        .times(1)
        .returning(|_, _| Ok(true));
    posts
        .expect_mark_published()
        .times(1)
        .returning(|_, _, _| Ok(true));

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().returning(|_, _| {
        Ok(PublishedPost {
            external_post_id: "fb_late".to_string(),
        })
    });

    let result = usecase(posts, accounts, MockNotificationRepository::new(), publisher)
        .run(params(pass_started))
        .await
        .unwrap();

    assert_eq!(result.published, 1);
}

#[tokio::test]
async fn failure_after_lost_claim_does_not_notify_twice() {
    let now = Utc::now();
    let due = post(Uuid::new_v4(), now);

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![due.clone()]));
    posts.expect_claim_post().returning(|_, _| Ok(true));
    // The stale sweep already failed the row and notified the user.
    posts
        .expect_mark_failed()
        .times(1)
        .returning(|_, _| Ok(false));

    let mut accounts = MockSocialAccountRepository::new();
    accounts.expect_find_account().returning(|_, _| Ok(None));

    let mut notifications = MockNotificationRepository::new();
    notifications.expect_create().never();

    let mut publisher = facebook_publisher();
    publisher.expect_publish().never();

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
}

#[tokio::test]
async fn success_after_lost_claim_keeps_the_pass_going() {
    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let first = post(user_id, now - Duration::minutes(2));
    let second = post(user_id, now - Duration::minutes(1));

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![first.clone(), second.clone()]));
    posts.expect_claim_post().times(2).returning(|_, _| Ok(true));
    posts
        .expect_mark_published()
        .times(2)
        .returning(|_, _, _| Ok(false));
    posts.expect_mark_failed().never();

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut notifications = MockNotificationRepository::new();
    notifications.expect_create().never();

    let mut publisher = facebook_publisher();
    publisher.expect_publish().times(2).returning(|_, _| {
        Ok(PublishedPost {
            external_post_id: "fb_x".to_string(),
        })
    });

    let result = usecase(posts, accounts, notifications, publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.published, 2);
}

#[tokio::test]
async fn future_and_failed_rows_are_never_claimed() {
    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let future = post(user_id, now + Duration::minutes(30));
    let mut failed = post(user_id, now - Duration::hours(1));
    failed.status = "failed".to_string();
    let due = post(user_id, now - Duration::minutes(1));
    let due_id = due.id;

    let mut posts = MockSocialPostRepository::new();
    posts
        .expect_list_due_posts()
        .returning(move |_, _, _, _| Ok(vec![future.clone(), failed.clone(), due.clone()]));
    posts
        .expect_claim_post()
        .withf(move |post_id, _| *post_id == due_id)
        .times(1)
        .returning(|_, _| Ok(true));
    posts
        .expect_mark_published()
        .with(eq(due_id), always(), always())
        .times(1)
        .returning(|_, _, _| Ok(true));

    let mut accounts = MockSocialAccountRepository::new();
    accounts
        .expect_find_account()
        .returning(move |user_id, _| Ok(Some(account(user_id, None))));

    let mut publisher = facebook_publisher();
    publisher.expect_publish().times(1).returning(|_, _| {
        Ok(PublishedPost {
            external_post_id: "fb_due".to_string(),
        })
    });

    let result = usecase(posts, accounts, MockNotificationRepository::new(), publisher)
        .run(params(now))
        .await
        .unwrap();

    assert_eq!(result.scanned, 1);
    assert_eq!(result.candidate_ids, vec![due_id]);
    assert_eq!(result.published_ids, vec![due_id]);
}

#[test]
fn long_error_messages_are_truncated() {
    let message = "x".repeat(5_000);
    let truncated = truncate_message(&message);
    assert_eq!(truncated.chars().count(), MAX_ERROR_MESSAGE_CHARS);
    assert!(truncated.ends_with("..."));
    assert_eq!(truncate_message("short"), "short");
}
