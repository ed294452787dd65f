// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::NameSet;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "ramendr.openshift.io", version = "v1alpha1", kind = "DRPolicy")]
#[serde(rename_all = "camelCase")]
pub struct DRPolicySpec {
    /// Managed clusters that share credential material under this policy
    #[serde(default)]
    pub dr_clusters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling_interval: Option<String>,
}

impl DRPolicy {
    /// Clusters spanned by this policy, duplicates collapsed
    pub fn cluster_names(&self) -> NameSet {
        self.spec.dr_clusters.iter().map(String::as_str).collect()
    }

    pub fn contains_cluster(&self, cluster_name: &str) -> bool {
        self.spec.dr_clusters.iter().any(|c| c == cluster_name)
    }
}
