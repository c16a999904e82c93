use clap::Subcommand;
use greenlicense_keys::KeyParams;
use greenlicense_license::{LicenseManager, LicenseResult};
use greenlicense_store::LicenseStore;
use greenlicense_types::KeyPairId;

use super::confirm;
use crate::output::Output;

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Generate a new key pair
    Generate {
        /// A name for the key pair
        #[arg(long)]
        name: String,

        /// Key size in bits
        #[arg(long, default_value_t = 256)]
        size: u32,
    },

    /// Show all key pairs
    Show,

    /// Remove a key pair no software uses
    Delete {
        /// ID of the key pair to remove
        #[arg(long)]
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run<S: LicenseStore>(
    command: &KeyCommand,
    manager: &LicenseManager<S>,
) -> LicenseResult<Output> {
    match command {
        KeyCommand::Generate { name, size } => {
            let params = KeyParams::new(name.as_str()).with_size(*size);
            let info = manager.generate_key_pair(&params)?;
            Ok(Output::success().with_key_pairs(vec![info]))
        }
        KeyCommand::Show => Ok(Output::success().with_key_pairs(manager.key_pairs()?)),
        KeyCommand::Delete { id, force } => {
            let id = KeyPairId::new(id)?;
            if !force && !confirm("Are you sure you want to delete the key pair?") {
                return Ok(Output::failed("User cancelled. Key pair has not been removed"));
            }
            let removed = manager.remove_key_pair(&id)?;
            Ok(Output::success().with_key_pairs(vec![removed]))
        }
    }
}
