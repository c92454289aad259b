// Environment-backed configuration, loaded once at first use.

use std::env;

/// Substituted when GEMINI_API_KEY is absent so the process still starts;
/// the gateway surfaces a distinct "not configured" reply on first failure.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

lazy_static::lazy_static! {
    pub static ref GEMINI_API_KEY: String = env::var("GEMINI_API_KEY")
        .unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string());
    pub static ref GEMINI_API_BASE: String = env::var("GEMINI_API_BASE")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref CHAT_MODEL: String = env::var("CHEFBOOT_CHAT_MODEL")
        .unwrap_or_else(|_| "gemini-2.5-flash".to_string());
    pub static ref IMAGE_MODEL: String = env::var("CHEFBOOT_IMAGE_MODEL")
        .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string());
}
