// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Computes which S3 secrets each cluster must hold.
//!
//! Everything here is recomputed from the full policy list on every pass.
//! A policy spanning clusters A and B makes both clusters need the secrets
//! of both clusters' profiles, since peers must reach each other's stores.

use crate::error::{DrError, Result};
use crate::propagation::ProfileDirectory;
use crate::types::{DRCluster, DRPolicy, NameSet};
use kube::ResourceExt;

/// Profiles of every cluster spanned by `policy` that has one
pub fn policy_profiles(policy: &DRPolicy, clusters: &[DRCluster]) -> NameSet {
    clusters
        .iter()
        .filter(|c| policy.contains_cluster(&c.name_any()))
        .filter_map(DRCluster::s3_profile)
        .collect()
}

/// Profiles that must stay reachable from `cluster_name`, optionally
/// ignoring the policy that is being deleted.
pub fn must_have_profiles(
    policies: &[DRPolicy],
    clusters: &[DRCluster],
    cluster_name: &str,
    ignore_policy: Option<&DRPolicy>,
) -> NameSet {
    let ignored = ignore_policy.map(|p| p.name_any());

    policies
        .iter()
        .filter(|p| ignored.as_deref() != Some(p.name_any().as_str()))
        .filter(|p| p.contains_cluster(cluster_name))
        .fold(NameSet::new(), |acc, p| {
            acc.union(&policy_profiles(p, clusters))
        })
}

/// Secrets that must stay on `cluster_name`. Profiles sharing a secret keep
/// it alive for each other.
pub fn must_have_secrets(
    policies: &[DRPolicy],
    clusters: &[DRCluster],
    cluster_name: &str,
    ignore_policy: Option<&DRPolicy>,
    directory: &ProfileDirectory<'_>,
) -> NameSet {
    directory.secrets_for(&must_have_profiles(
        policies,
        clusters,
        cluster_name,
        ignore_policy,
    ))
}

/// Secrets resolved for a policy together with the clusters that could not
/// be resolved.
#[derive(Debug, Default)]
pub struct Resolution {
    pub secrets: NameSet,
    pub errors: Vec<DrError>,
}

impl Resolution {
    pub fn first_error(&self) -> Option<&DrError> {
        self.errors.first()
    }

    /// Some clusters resolved while others did not
    pub fn is_partial(&self) -> bool {
        !self.secrets.is_empty() && !self.errors.is_empty()
    }

    /// A resolution is usable unless it failed and produced nothing.
    /// Tolerated errors are handed back alongside the secrets.
    pub fn into_deployable(self) -> Result<(NameSet, Vec<DrError>)> {
        if self.secrets.is_empty() {
            if let Some(first) = self.errors.into_iter().next() {
                return Err(first);
            }
            return Ok((self.secrets, Vec::new()));
        }
        Ok((self.secrets, self.errors))
    }
}

/// Resolve the secret of every cluster the policy itself spans, carrying on
/// past clusters whose profile is missing.
pub fn secret_names_for_policy(
    policy: &DRPolicy,
    clusters: &[DRCluster],
    directory: &ProfileDirectory<'_>,
) -> Resolution {
    let mut secrets = Vec::new();
    let mut errors = Vec::new();

    for cluster_name in policy.cluster_names() {
        let Some(cluster) = clusters.iter().find(|c| c.name_any() == cluster_name) else {
            errors.push(DrError::UnknownCluster {
                cluster: cluster_name,
            });
            continue;
        };

        let profile = cluster.spec.s3_profile_name.as_str();
        match directory.resolve_secret(profile) {
            Some(secret) => secrets.push(secret),
            None => errors.push(DrError::MissingProfile {
                profile: profile.to_string(),
                cluster: cluster_name,
            }),
        }
    }

    Resolution {
        secrets: secrets.into_iter().collect(),
        errors,
    }
}
