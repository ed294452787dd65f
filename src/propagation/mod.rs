// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! S3 secret propagation: requirement tracking, deploy and reclaim passes.

pub mod access;
pub mod directory;
pub mod engine;
pub mod guard;
pub mod requirements;
pub mod store;

pub use access::AccessControlBundle;
pub use directory::ProfileDirectory;
pub use engine::{DeployReport, SecretPropagator, UndeployReport};
pub use guard::{NoopGuard, PassGuard, PassPermit, SerialGuard};
pub use requirements::{
    must_have_profiles, must_have_secrets, policy_profiles, secret_names_for_policy, Resolution,
};
pub use store::{ClusterSecretStore, SecretEncoding, SecretFormat, SecretPlacement};
