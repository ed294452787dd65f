// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "ramendr.openshift.io", version = "v1alpha1", kind = "DRCluster")]
#[serde(rename_all = "camelCase")]
pub struct DRClusterSpec {
    /// Object-storage profile this cluster uses; empty when none is assigned
    #[serde(default)]
    pub s3_profile_name: String,
}

impl DRCluster {
    /// The cluster's S3 profile, if it has one
    pub fn s3_profile(&self) -> Option<&str> {
        let name = self.spec.s3_profile_name.as_str();
        (!name.is_empty()).then_some(name)
    }
}
