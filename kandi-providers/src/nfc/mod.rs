//! Platform NFC radio, modelled on the single-technology request API mobile
//! NFC stacks expose: start the manager, request a technology (resolves once a
//! tag is in the field), read the connected tag, cancel the request.

pub mod error;
pub mod imp;
pub mod model;

#[cfg(test)]
mod test;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait NfcPlatform: Send + Sync {
    async fn start(&self) -> Result<(), error::NfcError>;

    async fn is_enabled(&self) -> Result<bool, error::NfcError>;

    /// Suspends until a tag supporting the requested technology is presented.
    async fn request_technology(
        &self,
        request: &model::TechnologyRequest,
    ) -> Result<(), error::NfcError>;

    async fn read_tag(&self) -> Result<model::TagReading, error::NfcError>;

    /// Releases the technology request. Also wakes a pending `request_technology`.
    async fn cancel_technology_request(&self) -> Result<(), error::NfcError>;
}
