//! Collaborator seams for the kandi NFC core: the platform NFC radio, the
//! remote document store, the photo blob store and the signed-in identity,
//! each with the implementations the core ships with.

pub mod blob_storage;
pub mod common_models;
pub mod document_storage;
pub mod http_client;
pub mod identity;
pub mod nfc;
