use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub redis_url: Option<String>,
    /// How many days ahead a customer may book. `None` means no cap.
    pub booking_horizon_days: Option<u32>,
    /// Offset of the shop's wall clock from UTC, used to decide what "today" is.
    pub shop_utc_offset_minutes: i32,
    pub store_timeout_secs: u64,
    pub store_max_retries: u32,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            redis_url: None,
            booking_horizon_days: Some(60),
            shop_utc_offset_minutes: 0,
            store_timeout_secs: 5,
            store_max_retries: 2,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 60,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            booking_horizon_days: match parse_var::<u32>("BOOKING_HORIZON_DAYS") {
                Some(0) => None,
                Some(days) => Some(days),
                None => defaults.booking_horizon_days,
            },
            shop_utc_offset_minutes: parse_var("SHOP_UTC_OFFSET_MINUTES")
                .unwrap_or(defaults.shop_utc_offset_minutes),
            store_timeout_secs: parse_var("STORE_TIMEOUT_SECS")
                .unwrap_or(defaults.store_timeout_secs),
            store_max_retries: parse_var("STORE_MAX_RETRIES")
                .unwrap_or(defaults.store_max_retries),
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or(defaults.rate_limit_max_requests),
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or(defaults.rate_limit_window_secs),
            port: parse_var("PORT").unwrap_or(defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} has an invalid value '{}', using default", name, raw);
            None
        }
    }
}
