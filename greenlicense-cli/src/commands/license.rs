use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Subcommand;
use greenlicense_license::{IssueRequest, LicenseManager, LicenseResult};
use greenlicense_store::LicenseStore;
use greenlicense_types::SoftwareId;

use crate::output::{LicenseOutput, Output};

#[derive(Subcommand, Debug)]
pub enum LicenseCommand {
    /// Issue a license key
    Issue {
        /// ID of the software to license
        #[arg(long)]
        software: String,

        /// Customer the license is issued to (V2 only)
        #[arg(long)]
        customer: Option<String>,

        /// Expiry as YYYY-MM-DD (end of day UTC) or RFC 3339 (V2 only)
        #[arg(long, value_parser = parse_expiry)]
        expires: Option<DateTime<Utc>>,
    },

    /// Verify a license key
    Verify {
        /// ID of the software the key is for
        #[arg(long)]
        software: String,

        /// License key, in either text form
        #[arg(long)]
        key: String,
    },

    /// Print the public key to embed in the licensed application
    PublicKey {
        /// ID of the software
        #[arg(long)]
        software: String,
    },
}

pub fn run<S: LicenseStore>(
    command: &LicenseCommand,
    manager: &LicenseManager<S>,
) -> LicenseResult<Output> {
    match command {
        LicenseCommand::Issue {
            software,
            customer,
            expires,
        } => {
            let software_id = SoftwareId::new(software)?;
            let request = IssueRequest {
                customer: customer.clone(),
                expires_at: *expires,
            };
            let key = manager.issue(&software_id, &request)?;
            Ok(Output::success().with_license(LicenseOutput::issued(&key)))
        }
        LicenseCommand::Verify { software, key } => {
            let software_id = SoftwareId::new(software)?;
            let claims = manager.verify_now(&software_id, key)?;
            Ok(Output::success().with_license(LicenseOutput::verified(claims, Utc::now())))
        }
        LicenseCommand::PublicKey { software } => {
            let software_id = SoftwareId::new(software)?;
            let exported = manager.public_key(&software_id)?;
            Ok(Output::success().with_license(LicenseOutput::public_key(exported)))
        }
    }
}

/// A bare date means the license is good through the end of that day.
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        return Ok(date.and_time(end_of_day).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| format!("invalid expiry '{raw}': expected YYYY-MM-DD or RFC 3339"))
}
