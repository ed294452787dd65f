// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Open Cluster Management ManifestWork: objects the hub applies on a managed cluster
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "work.open-cluster-management.io", version = "v1", kind = "ManifestWork")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ManifestWorkSpec {
    pub workload: ManifestsTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_option: Option<DeleteOption>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManifestsTemplate {
    #[serde(default)]
    pub manifests: Vec<serde_json::Value>,
}

/// What the work agent does with applied objects once the work is deleted
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOption {
    pub propagation_policy: PropagationPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectively_orphans: Option<SelectivelyOrphan>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub enum PropagationPolicy {
    #[default]
    Foreground,
    Orphan,
    SelectivelyOrphan,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectivelyOrphan {
    #[serde(default)]
    pub orphaning_rules: Vec<OrphaningRule>,
}

/// One object left in place on the managed cluster when the work goes away
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct OrphaningRule {
    /// Empty for the core group
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
}
