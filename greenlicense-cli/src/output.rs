//! Result envelope printed by every command.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use greenlicense_keys::KeyPairInfo;
use greenlicense_license::{ErrorKind, LicenseClaims, LicenseError, LicenseKey};
use greenlicense_types::Software;
use serde::Serialize;

/// Command outcome: success flag, error messages and affected records.
#[derive(Debug, Default, Serialize)]
pub struct Output {
    pub success: bool,
    pub error_messages: Vec<ErrorMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_pairs: Vec<KeyPairInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub software: Vec<Software>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseOutput>,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

/// License key details for `license` commands.
#[derive(Debug, Default, Serialize)]
pub struct LicenseOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<LicenseClaims>,
    /// Whole days left on a time-limited license at verification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl LicenseOutput {
    pub fn issued(key: &LicenseKey) -> Self {
        Self {
            key: Some(key.to_text()),
            token: Some(key.to_token()),
            claims: Some(key.claims().clone()),
            ..Self::default()
        }
    }

    pub fn verified(claims: LicenseClaims, now: DateTime<Utc>) -> Self {
        Self {
            days_remaining: claims.days_until_expiry(now),
            claims: Some(claims),
            ..Self::default()
        }
    }

    pub fn public_key(exported: String) -> Self {
        Self {
            public_key: Some(exported),
            ..Self::default()
        }
    }
}

impl Output {
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_messages: vec![ErrorMessage {
                message: message.into(),
                kind: None,
            }],
            ..Self::default()
        }
    }

    pub fn error(err: &LicenseError) -> Self {
        Self {
            success: false,
            error_messages: vec![ErrorMessage {
                message: err.to_string(),
                kind: Some(err.kind()),
            }],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_key_pairs(mut self, key_pairs: Vec<KeyPairInfo>) -> Self {
        self.key_pairs = key_pairs;
        self
    }

    #[must_use]
    pub fn with_software(mut self, software: Vec<Software>) -> Self {
        self.software = software;
        self
    }

    #[must_use]
    pub fn with_license(mut self, license: LicenseOutput) -> Self {
        self.license = Some(license);
        self
    }

    /// Pretty JSON, or tab-separated rows for humans.
    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(self).unwrap_or_else(|e| {
                format!(
                    "{{\"success\": false, \"error_messages\": [{{\"message\": \"{e}\"}}]}}"
                )
            })
        } else {
            self.render_text()
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        for error in &self.error_messages {
            let _ = writeln!(out, "error: {}", error.message);
        }
        for pair in &self.key_pairs {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                pair.id, pair.name, pair.algorithm, pair.size, pair.public_key
            );
        }
        for software in &self.software {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                software.id(),
                software.name(),
                software.version(),
                software.key_pair_id(),
                software.license_version()
            );
        }
        if let Some(license) = &self.license {
            render_license(&mut out, license);
        }
        out.trim_end().to_string()
    }
}

fn render_license(out: &mut String, license: &LicenseOutput) {
    if let Some(key) = &license.key {
        let _ = writeln!(out, "key\t{key}");
    }
    if let Some(token) = &license.token {
        let _ = writeln!(out, "token\t{token}");
    }
    if let Some(public_key) = &license.public_key {
        let _ = writeln!(out, "public_key\t{public_key}");
    }
    if let Some(claims) = &license.claims {
        let _ = writeln!(out, "version\t{}", claims.version);
        let _ = writeln!(out, "software_id\t{}", claims.software_id);
        let _ = writeln!(out, "software_version\t{}", claims.software_version);
        if let Some(name) = &claims.software_name {
            let _ = writeln!(out, "software_name\t{name}");
        }
        if let Some(customer) = &claims.customer {
            let _ = writeln!(out, "customer\t{customer}");
        }
        match claims.expires_at {
            Some(expires_at) => {
                let _ = writeln!(out, "expires_at\t{}", expires_at.to_rfc3339());
                if let Some(days) = license.days_remaining {
                    let _ = writeln!(out, "days_remaining\t{days}");
                }
            }
            None => {
                let _ = writeln!(out, "expires_at\tnever");
            }
        }
    }
}
