//! Configuration module for the intake backend.
//!
//! All configuration is loaded from environment variables with sensible
//! defaults. Every mail-related setting is optional: without a complete SMTP
//! configuration the server still runs and handles requests, it just skips
//! notification delivery.

use std::env;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Recipient for staff notification copies (skipped when unset)
    pub staff_email: Option<String>,
    /// SMTP relay host
    pub smtp_host: Option<String>,
    /// SMTP relay port (465 uses implicit TLS, anything else STARTTLS)
    pub smtp_port: u16,
    /// SMTP username, also used as the From address
    pub smtp_user: Option<String>,
    /// SMTP password
    pub smtp_password: Option<String>,
    /// Base URL of the IP geolocation provider
    pub geo_base_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// A complete SMTP configuration; present only when host, user and password
/// are all set.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let staff_email = env::var("INTAKE_STAFF_EMAIL").ok();
        let smtp_host = env::var("INTAKE_SMTP_HOST").ok();
        let smtp_port = env::var("INTAKE_SMTP_PORT")
            .unwrap_or_else(|_| "465".to_string())
            .parse()
            .expect("Invalid INTAKE_SMTP_PORT format");
        let smtp_user = env::var("INTAKE_SMTP_USER").ok();
        let smtp_password = env::var("INTAKE_SMTP_PASSWORD").ok();

        let geo_base_url =
            env::var("INTAKE_GEO_BASE_URL").unwrap_or_else(|_| "https://ipwho.is".to_string());

        let bind_addr = env::var("INTAKE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid INTAKE_BIND_ADDR format");

        let log_level = env::var("INTAKE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            staff_email,
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            geo_base_url,
            bind_addr,
            log_level,
        }
    }

    /// The SMTP settings, when the configuration is complete enough to send.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        match (&self.smtp_host, &self.smtp_user, &self.smtp_password) {
            (Some(host), Some(user), Some(password)) => Some(SmtpSettings {
                host: host.clone(),
                port: self.smtp_port,
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
