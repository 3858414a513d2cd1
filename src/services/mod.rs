// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod object_store;
pub mod password;
pub mod thumbnail;
pub mod upload;

pub use object_store::ObjectStore;
pub use password::PasswordVault;
pub use thumbnail::Thumbnailer;
pub use upload::{StagedUpload, UploadPipeline, UploadRequest};
