use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub whatsapp: Option<WhatsAppConfig>,
}

/// WhatsApp Business Cloud API channel config.
///
/// Inbound messages arrive on the bot's `/whatsapp` route, which must be
/// registered as the app's webhook in the Meta dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Permanent or system-user access token.
    #[serde(default)]
    pub access_token: String,
    /// ID of the bot's phone number (not the number itself).
    #[serde(default)]
    pub phone_number_id: String,
    /// Shared secret echoed back during webhook verification.
    #[serde(default)]
    pub verify_token: String,
    #[serde(default = "default_graph_api_version")]
    pub api_version: String,
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    /// Allowed phone numbers (e.g. `["5511999887766"]`). Empty = allow all.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_token: String::new(),
            phone_number_id: String::new(),
            verify_token: String::new(),
            api_version: default_graph_api_version(),
            base_url: default_graph_base_url(),
            allowed_users: Vec::new(),
        }
    }
}
