/// Session token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    pub fn expiration(&self) -> chrono::Duration {
        chrono::Duration::hours(self.expiration_hours as i64)
    }
}

/// Password reset link settings
#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    /// Base URL of the public site, the reset page lives at `{base}/reset-password`
    pub public_base_url: String,
    pub token_ttl_minutes: u64,
}

impl PasswordResetConfig {
    pub fn new(public_base_url: String, token_ttl_minutes: u64) -> Self {
        Self {
            public_base_url,
            token_ttl_minutes,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes as i64)
    }

    pub fn reset_link(&self, raw_token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.public_base_url.trim_end_matches('/'),
            raw_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_strips_trailing_slash() {
        let config = PasswordResetConfig::new("https://morgana.example/".to_string(), 60);
        assert_eq!(
            config.reset_link("abc"),
            "https://morgana.example/reset-password?token=abc"
        );
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(60));
    }
}
