//! Data access contract.

use crate::error::ClientError;
use crate::models::{Assessment, Patient, Provider, RfidTag};
use std::sync::Arc;

/// Everything the kiosk asks of the remote data service.
///
/// Calls block until the service answers.
pub trait DataService {
    /// Asks the service to publish newly generated assessments.
    fn post_assessments(&self) -> Result<(), ClientError>;

    /// Looks up a badge by its card code.
    fn rfid_tag(&self, code: &str) -> Result<RfidTag, ClientError>;

    fn provider(&self, provider_id: u64) -> Result<Provider, ClientError>;

    /// Patients assigned to a provider, in service order.
    fn patients(&self, provider_id: u64) -> Result<Vec<Patient>, ClientError>;

    /// Assessments for a patient, in service order.
    fn assessments(&self, patient_id: u64) -> Result<Vec<Assessment>, ClientError>;

    /// Sets the provider-reviewed flag of an assessment to `Y`.
    fn mark_reviewed(&self, assessment_id: u64) -> Result<(), ClientError>;

    /// Resolves a badge to its provider.
    ///
    /// A card with no provider counts as not found.
    fn resolve_badge(&self, code: &str) -> Result<Provider, ClientError> {
        let tag = self.rfid_tag(code)?;
        let provider_id = tag
            .provider_id
            .ok_or_else(|| ClientError::not_found(format!("provider for card {code}")))?;
        self.provider(provider_id)
    }
}

macro_rules! forward_data_service {
    ($($ty:ty),*) => {$(
        impl<T: DataService + ?Sized> DataService for $ty {
            fn post_assessments(&self) -> Result<(), ClientError> {
                (**self).post_assessments()
            }

            fn rfid_tag(&self, code: &str) -> Result<RfidTag, ClientError> {
                (**self).rfid_tag(code)
            }

            fn provider(&self, provider_id: u64) -> Result<Provider, ClientError> {
                (**self).provider(provider_id)
            }

            fn patients(&self, provider_id: u64) -> Result<Vec<Patient>, ClientError> {
                (**self).patients(provider_id)
            }

            fn assessments(&self, patient_id: u64) -> Result<Vec<Assessment>, ClientError> {
                (**self).assessments(patient_id)
            }

            fn mark_reviewed(&self, assessment_id: u64) -> Result<(), ClientError> {
                (**self).mark_reviewed(assessment_id)
            }
        }
    )*};
}

forward_data_service!(&T, Box<T>, Arc<T>);
