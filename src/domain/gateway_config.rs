use std::fmt;

pub const PRODUCTION_ENVIRONMENT: &str = "production";

#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub environment: String,
    pub webhook_secret: Option<String>,
    pub webhook_secret_sandbox: Option<String>,
    pub base_url: String,
}

impl GatewayConfig {
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_ENVIRONMENT
    }

    /// Secret for webhook signatures. Non-production environments prefer the
    /// sandbox secret and fall back to the primary one.
    pub fn signing_secret(&self) -> Option<&str> {
        let primary = non_empty(self.webhook_secret.as_deref());
        if self.is_production() {
            return primary;
        }
        non_empty(self.webhook_secret_sandbox.as_deref()).or(primary)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("environment", &self.environment)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[redacted]"))
            .field(
                "webhook_secret_sandbox",
                &self.webhook_secret_sandbox.as_ref().map(|_| "[redacted]"),
            )
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
