pub mod generate_allowlist;
pub mod show_schedule;
pub mod simulate;
pub mod validate_config;
