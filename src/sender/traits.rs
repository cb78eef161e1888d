//! Transmitter trait definition.

use super::error::DeliveryError;
use super::pool::DeliveryHandle;
use crate::types::Locale;

/// Channel capable of delivering verification codes.
///
/// Both operations return as soon as the delivery is dispatched. `Err` means
/// the delivery never started; otherwise the returned [`DeliveryHandle`]
/// resolves to whether the gateway accepted it.
pub trait Transmitter: Send + Sync {
    /// Send a verification code by SMS.
    ///
    /// # Arguments
    /// * `destination` - Recipient phone number, non-empty
    /// * `client_type` - Optional platform tag (`ios`, `android-ng`) choosing the wording
    /// * `verification_code` - Code to deliver, non-empty
    fn deliver_sms_verification(
        &self,
        destination: &str,
        client_type: Option<&str>,
        verification_code: &str,
    ) -> Result<DeliveryHandle, DeliveryError>;

    /// Deliver a verification code by voice call.
    fn deliver_vox_verification(
        &self,
        destination: &str,
        verification_code: &str,
        locale: Option<&Locale>,
    ) -> Result<DeliveryHandle, DeliveryError>;
}
