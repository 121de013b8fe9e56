// Integration tests driving the full router

#[path = "../common/mod.rs"]
mod common;

mod test_profile_api;
