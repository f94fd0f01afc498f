pub mod publish_posts;
