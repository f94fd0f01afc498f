pub mod notifications;
pub mod plans;
pub mod social_accounts;
pub mod social_posts;
pub mod subscriptions;
pub mod team_members;
pub mod usage;
