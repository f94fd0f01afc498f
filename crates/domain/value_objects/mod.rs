pub mod enums;
pub mod permissions;
pub mod plans;
pub mod social_posts;
pub mod usage_limits;
