pub mod permissions;
pub mod plan_resolver;
pub mod usage_limits;
