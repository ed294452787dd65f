// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lookup from S3 profile name to the secret authenticating it.

use crate::config::S3StoreProfile;
use crate::types::NameSet;

/// Read-only view over the configured S3 store profiles.
///
/// Several profiles may point at the same secret, so a secret can only be
/// removed from a cluster once no required profile maps to it any more.
#[derive(Debug, Clone, Copy)]
pub struct ProfileDirectory<'a> {
    profiles: &'a [S3StoreProfile],
}

impl<'a> ProfileDirectory<'a> {
    pub fn new(profiles: &'a [S3StoreProfile]) -> Self {
        Self { profiles }
    }

    /// Secret backing `profile_name`, if the profile is configured
    pub fn resolve_secret(&self, profile_name: &str) -> Option<&'a str> {
        self.profiles
            .iter()
            .find(|p| p.s3_profile_name == profile_name)
            .map(|p| p.s3_secret_ref.name.as_str())
    }

    /// Secrets backing any of `profiles`; unknown profiles contribute nothing
    pub fn secrets_for(&self, profiles: &NameSet) -> NameSet {
        self.profiles
            .iter()
            .filter(|p| profiles.contains(&p.s3_profile_name))
            .map(|p| p.s3_secret_ref.name.as_str())
            .collect()
    }
}
