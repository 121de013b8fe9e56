// Domain managers for profiles and posts

pub mod post_manager;
pub mod profile_manager;
