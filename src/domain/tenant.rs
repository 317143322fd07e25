//! Tenant (restaurant account) configuration consumed by the voice agent
use crate::domain::shared::{PhoneNumber, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Prompt used when the tenant has not configured one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant taking food orders.";

/// Appended to every prompt so the model submits orders through the tool
pub const ORDER_TOOL_DIRECTIVE: &str = "When the order is confirmed, you MUST use the 'create_order_tool' to submit it. Ask for name and address if missing.";

/// Canonical fallback voice
pub const DEFAULT_VOICE: &str = "alloy";

/// Snapshot of a tenant's agent settings, fetched once per call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub system_prompt: Option<String>,
    pub menu: Option<String>,
    pub voice: Option<String>,
    pub agent_enabled: bool,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            menu: None,
            voice: None,
            agent_enabled: true,
        }
    }
}

impl TenantConfig {
    /// Effective instructions for the realtime session
    ///
    /// Tenant prompt (or the default one), then the menu when present, then
    /// the order tool directive.
    pub fn instructions(&self) -> String {
        let mut instructions = non_blank(self.system_prompt.as_deref())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
            .to_string();

        if let Some(menu) = non_blank(self.menu.as_deref()) {
            instructions.push_str("\n\nHere is the Menu:\n");
            instructions.push_str(menu);
        }

        instructions.push_str("\n\n");
        instructions.push_str(ORDER_TOOL_DIRECTIVE);
        instructions
    }

    /// Tenant voice, or `fallback` when none is configured
    pub fn voice_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(self.voice.as_deref()).unwrap_or(fallback)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolves the tenant owning a dialed number
///
/// Implementations must try both the number as given and the number with its
/// leading `+` toggled (see [`PhoneNumber::candidates`]) before returning
/// `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    async fn lookup(&self, dialed: &PhoneNumber) -> Result<Option<TenantConfig>>;
}
