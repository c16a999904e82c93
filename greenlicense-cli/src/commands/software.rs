use clap::Subcommand;
use greenlicense_license::{LicenseManager, LicenseResult};
use greenlicense_store::LicenseStore;
use greenlicense_types::{KeyPairId, LicenseVersion, SoftwareId};

use super::confirm;
use crate::config::Config;
use crate::output::Output;

#[derive(Subcommand, Debug)]
pub enum SoftwareCommand {
    /// Register new software
    Create {
        /// ID of the key pair that signs this software's licenses
        #[arg(long)]
        key: String,

        /// License version (1 or 2); defaults to the configured version
        #[arg(long)]
        license: Option<LicenseVersion>,

        /// Software name
        #[arg(long)]
        name: String,

        /// Software version
        #[arg(long)]
        version: String,
    },

    /// Show all software
    Show,

    /// Remove software. Its key pair is kept.
    Delete {
        /// ID of the software to remove
        #[arg(long)]
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run<S: LicenseStore>(
    command: &SoftwareCommand,
    manager: &LicenseManager<S>,
    config: &Config,
) -> LicenseResult<Output> {
    match command {
        SoftwareCommand::Create {
            key,
            license,
            name,
            version,
        } => {
            let key_pair_id = KeyPairId::new(key)?;
            let license_version = license.unwrap_or(config.default_license_version);
            let software =
                manager.register_software(name, version, key_pair_id, license_version)?;
            Ok(Output::success().with_software(vec![software]))
        }
        SoftwareCommand::Show => Ok(Output::success().with_software(manager.all_software()?)),
        SoftwareCommand::Delete { id, force } => {
            let id = SoftwareId::new(id)?;
            if !force && !confirm("Are you sure you want to delete the software?") {
                return Ok(Output::failed("User cancelled. Software has not been removed"));
            }
            let removed = manager.remove_software(&id)?;
            Ok(Output::success().with_software(vec![removed]))
        }
    }
}
