use uuid::Uuid;

pub mod audit;
pub mod auth_cache;
pub mod config;
pub mod errors;
pub mod time_provider;


pub fn generate_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}
