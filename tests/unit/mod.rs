// Unit tests organized by component

#[path = "../common/mod.rs"]
mod common;

mod test_app_state;
mod test_auth_gate;
mod test_config;
mod test_profile_manager;
