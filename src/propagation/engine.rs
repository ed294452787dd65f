// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deploys S3 secrets for a policy and reclaims them when it goes away.

use crate::config::Config;
use crate::error::{DrError, Result};
use crate::propagation::requirements::{must_have_secrets, secret_names_for_policy, Resolution};
use crate::propagation::{
    AccessControlBundle, ClusterSecretStore, PassGuard, ProfileDirectory, SecretEncoding,
    SecretPlacement,
};
use crate::types::{DRCluster, DRPolicy, NameSet};
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of a deploy pass
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Secret/cluster pairs pushed, each in every enabled encoding
    pub pushed: usize,
    /// Clusters whose secret could not be resolved; tolerated because others were
    pub unresolved: Vec<DrError>,
}

/// Outcome of an undeploy pass
#[derive(Debug, Default)]
pub struct UndeployReport {
    /// Secret/cluster pairs removed
    pub removed: usize,
    /// Secret/cluster pairs kept because another policy still needs them
    pub retained: usize,
    pub unresolved: Vec<DrError>,
}

/// Runs deploy and undeploy passes against a cluster secret store.
///
/// Both passes hold the guard from before their first read until their last
/// mutation, so one pass never observes another half-done.
pub struct SecretPropagator {
    store: Arc<dyn ClusterSecretStore>,
    guard: Arc<dyn PassGuard>,
    config: Config,
}

impl SecretPropagator {
    pub fn new(
        store: Arc<dyn ClusterSecretStore>,
        guard: Arc<dyn PassGuard>,
        config: Config,
    ) -> Self {
        Self {
            store,
            guard,
            config,
        }
    }

    /// Push every secret the policy's clusters need onto each of those clusters.
    #[instrument(skip_all, fields(policy = %policy.name_any()))]
    pub async fn deploy(&self, policy: &DRPolicy, clusters: &[DRCluster]) -> Result<DeployReport> {
        let _permit = self.guard.acquire().await;

        let settings = &self.config.propagation;
        if !settings.distribution_enabled() {
            debug!("S3 secret distribution disabled, skipping deploy");
            return Ok(DeployReport::default());
        }

        let directory = ProfileDirectory::new(&settings.s3_store_profiles);
        let resolution = secret_names_for_policy(policy, clusters, &directory);
        if resolution.is_partial() {
            for err in &resolution.errors {
                warn!("Received partial list: {}", err);
            }
        }
        let (secrets, unresolved) = resolution.into_deployable()?;

        let bundle = AccessControlBundle::for_namespace(settings.dr_cluster_operator_namespace());
        let encodings = SecretEncoding::enabled(settings.backup_namespace());

        let mut pushed = 0;
        for cluster in policy.cluster_names() {
            for secret in secrets.iter() {
                self.push_secret(secret, &cluster, &bundle, &encodings).await?;
                pushed += 1;
            }
        }

        info!(
            "Deployed {} secret(s) {} across {} cluster(s)",
            secrets.len(),
            secrets,
            policy.cluster_names().len()
        );

        Ok(DeployReport { pushed, unresolved })
    }

    async fn push_secret(
        &self,
        secret: &str,
        cluster: &str,
        bundle: &AccessControlBundle,
        encodings: &[SecretEncoding],
    ) -> Result<()> {
        let settings = &self.config.propagation;

        for encoding in encodings {
            let placement = SecretPlacement {
                secret,
                cluster,
                source_namespace: &self.config.operator_namespace,
                target_namespace: settings.dr_cluster_operator_namespace(),
                bundle,
                encoding,
            };

            self.store
                .create_or_update_secret(&placement)
                .await
                .map_err(|e| DrError::SecretPush {
                    secret: secret.to_string(),
                    cluster: cluster.to_string(),
                    encoding: encoding.format(),
                    source: Box::new(e),
                })?;
        }

        info!("Pushed secret '{}' to drcluster '{}'", secret, cluster);
        Ok(())
    }

    /// Remove the secrets only `policy` required from the clusters it spans.
    ///
    /// `policy` may still appear in the fresh listing; it is excluded by name.
    #[instrument(skip_all, fields(policy = %policy.name_any()))]
    pub async fn undeploy(
        &self,
        policy: &DRPolicy,
        clusters: &[DRCluster],
    ) -> Result<UndeployReport> {
        let _permit = self.guard.acquire().await;

        let settings = &self.config.propagation;
        if !settings.distribution_enabled() {
            debug!("S3 secret distribution disabled, skipping undeploy");
            return Ok(UndeployReport::default());
        }

        let policies = self
            .store
            .list_policies()
            .await
            .map_err(|e| DrError::PolicyList(Box::new(e)))?;

        let directory = ProfileDirectory::new(&settings.s3_store_profiles);

        let survivors: Vec<(String, NameSet)> = policy
            .cluster_names()
            .into_iter()
            .map(|cluster| {
                let keep =
                    must_have_secrets(&policies, clusters, &cluster, Some(policy), &directory);
                (cluster, keep)
            })
            .collect();

        let Resolution {
            secrets: candidates,
            errors: unresolved,
        } = secret_names_for_policy(policy, clusters, &directory);
        for err in &unresolved {
            error!("error in retrieving secret names: {}", err);
        }

        let formats: Vec<_> = SecretEncoding::enabled(settings.backup_namespace())
            .iter()
            .map(SecretEncoding::format)
            .collect();

        let mut report = UndeployReport {
            unresolved,
            ..Default::default()
        };

        for (cluster, keep) in &survivors {
            for secret in candidates.iter().filter(|s| keep.contains(s)) {
                debug!(
                    "Secret '{}' still required on drcluster '{}', leaving it in place",
                    secret, cluster
                );
                report.retained += 1;
            }

            for secret in candidates.difference(keep) {
                for format in &formats {
                    self.store
                        .delete_secret(&secret, cluster, &self.config.operator_namespace, *format)
                        .await
                        .map_err(|e| DrError::SecretRemove {
                            secret: secret.clone(),
                            cluster: cluster.clone(),
                            encoding: *format,
                            source: Box::new(e),
                        })?;
                }
                info!("Removed secret '{}' from drcluster '{}'", secret, cluster);
                report.removed += 1;
            }
        }

        Ok(report)
    }
}
