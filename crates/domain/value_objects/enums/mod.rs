pub mod post_statuses;
pub mod social_providers;
pub mod subscription_statuses;
pub mod team_roles;
