pub mod publish_scheduled_posts;
