// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster secret store backed by the hub API and OCM ManifestWorks.

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::kubernetes::render::{build_manifestwork, manifestwork_name, render_secret};
use crate::propagation::{ClusterSecretStore, SecretFormat, SecretPlacement};
use crate::types::{DRPolicy, ManifestWork};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, ListParams, Patch, PatchParams},
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Places secrets on managed clusters by applying one ManifestWork per
/// secret and encoding into the cluster's namespace on the hub.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterSecretStore for KubeSecretStore {
    #[instrument(skip(self))]
    async fn list_policies(&self) -> Result<Vec<DRPolicy>> {
        let policies: Api<DRPolicy> = Api::all(self.client.clone());
        Ok(policies.list(&ListParams::default()).await?.items)
    }

    #[instrument(
        skip(self, placement),
        fields(
            secret = %placement.secret,
            cluster = %placement.cluster,
            format = %placement.encoding.format()
        )
    )]
    async fn create_or_update_secret(&self, placement: &SecretPlacement<'_>) -> Result<()> {
        let sources: Api<Secret> = Api::namespaced(self.client.clone(), placement.source_namespace);
        let source = sources.get(placement.secret).await?;

        let rendered = render_secret(&source, placement)?;
        let work = build_manifestwork(placement, &rendered)?;
        let name = manifestwork_name(placement.secret, placement.encoding.format());

        // Apply the ManifestWork (create or update)
        let works: Api<ManifestWork> = Api::namespaced(self.client.clone(), placement.cluster);
        let pp = PatchParams::apply(OPERATOR_NAME).force();
        works.patch(&name, &pp, &Patch::Apply(&work)).await?;

        info!(
            "Applied ManifestWork {}/{} for secret {}/{}",
            placement.cluster, name, placement.source_namespace, placement.secret
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_secret(
        &self,
        secret: &str,
        cluster: &str,
        source_namespace: &str,
        format: SecretFormat,
    ) -> Result<()> {
        let name = manifestwork_name(secret, format);
        let works: Api<ManifestWork> = Api::namespaced(self.client.clone(), cluster);

        match works.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!("Deleted ManifestWork {}/{}", cluster, name);
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("ManifestWork {}/{} already absent", cluster, name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
