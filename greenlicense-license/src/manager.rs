//! Store-backed facade over issuance and verification.

use crate::{IssueRequest, LicenseError, LicenseKey, LicenseResult, VerificationResult};
use chrono::{DateTime, Utc};
use greenlicense_keys::{KeyPair, KeyPairInfo, KeyParams, PublicKey};
use greenlicense_store::LicenseStore;
use greenlicense_types::{KeyPairId, LicenseVersion, Software, SoftwareId};
use tracing::info;

/// Resolves software entries and key pairs from an injected store and runs
/// issuance and verification against them.
///
/// ```ignore
/// let manager = LicenseManager::new(MemoryStore::new());
/// let key_pair = manager.generate_key_pair(&KeyParams::new("release"))?;
/// let software = manager.register_software("Acme Tool", "1.0", key_pair.id, LicenseVersion::V2)?;
/// let key = manager.issue(software.id(), &IssueRequest::new().customer("cust-42"))?;
/// manager.verify(software.id(), &key.to_text(), Utc::now())?;
/// ```
pub struct LicenseManager<S> {
    store: S,
}

impl<S: LicenseStore> LicenseManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates and stores a key pair.
    pub fn generate_key_pair(&self, params: &KeyParams) -> LicenseResult<KeyPairInfo> {
        Ok(self.store.generate_key_pair(params)?)
    }

    /// Lists key pairs without secret material.
    pub fn key_pairs(&self) -> LicenseResult<Vec<KeyPairInfo>> {
        Ok(self.store.all_key_pairs()?)
    }

    pub fn key_pair(&self, id: &KeyPairId) -> LicenseResult<KeyPairInfo> {
        self.store
            .get_key_pair_info(id)?
            .ok_or_else(|| LicenseError::NotFound(format!("key pair {id}")))
    }

    /// Removes a key pair no software references.
    pub fn remove_key_pair(&self, id: &KeyPairId) -> LicenseResult<KeyPairInfo> {
        Ok(self.store.remove_key_pair(id)?)
    }

    /// Registers software under a generated id.
    ///
    /// Fails with [`LicenseError::NotFound`] if the key pair does not exist.
    pub fn register_software(
        &self,
        name: &str,
        version: &str,
        key_pair_id: KeyPairId,
        license_version: LicenseVersion,
    ) -> LicenseResult<Software> {
        let software = Software::register(name, version, key_pair_id, license_version)?;
        self.add_software(software)
    }

    /// Stores a software entry built by the caller, keeping its id.
    pub fn add_software(&self, software: Software) -> LicenseResult<Software> {
        let software = self.store.add_software(software)?;
        info!(
            software_id = %software.id(),
            license_version = %software.license_version(),
            "Registered software"
        );
        Ok(software)
    }

    pub fn software(&self, id: &SoftwareId) -> LicenseResult<Software> {
        self.store
            .get_software(id)?
            .ok_or_else(|| LicenseError::NotFound(format!("software {id}")))
    }

    pub fn all_software(&self) -> LicenseResult<Vec<Software>> {
        Ok(self.store.all_software()?)
    }

    /// Removes a software entry. Its key pair is left in place.
    pub fn remove_software(&self, id: &SoftwareId) -> LicenseResult<Software> {
        Ok(self.store.remove_software(id)?)
    }

    /// Issues a license key for a registered software entry.
    pub fn issue(
        &self,
        software_id: &SoftwareId,
        request: &IssueRequest,
    ) -> LicenseResult<LicenseKey> {
        let software = self.software(software_id)?;
        let key_pair = self.load_key_pair(software.key_pair_id())?;
        crate::issue(&software, &key_pair, request)
    }

    /// Verifies a license key against a registered software entry.
    ///
    /// Only the public half of the software's key pair is read.
    pub fn verify(
        &self,
        software_id: &SoftwareId,
        text: &str,
        now: DateTime<Utc>,
    ) -> VerificationResult {
        let (software, public_key) = self.verification_target(software_id)?;
        crate::verify(text, &software, &public_key, now)
    }

    /// [`LicenseManager::verify`] at the current time.
    pub fn verify_now(&self, software_id: &SoftwareId, text: &str) -> VerificationResult {
        let (software, public_key) = self.verification_target(software_id)?;
        crate::verify_now(text, &software, &public_key)
    }

    /// Exported public key for embedding in the licensed application.
    pub fn public_key(&self, software_id: &SoftwareId) -> LicenseResult<String> {
        let (_, public_key) = self.verification_target(software_id)?;
        Ok(public_key.export())
    }

    fn verification_target(
        &self,
        software_id: &SoftwareId,
    ) -> LicenseResult<(Software, PublicKey)> {
        let software = self.software(software_id)?;
        let public_key = self
            .store
            .get_public_key(software.key_pair_id())?
            .ok_or_else(|| {
                LicenseError::NotFound(format!("key pair {}", software.key_pair_id()))
            })?;
        Ok((software, public_key))
    }

    fn load_key_pair(&self, id: &KeyPairId) -> LicenseResult<KeyPair> {
        self.store
            .get_key_pair(id)?
            .ok_or_else(|| LicenseError::NotFound(format!("key pair {id}")))
    }
}
