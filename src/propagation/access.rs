// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! RBAC objects shipped to a managed cluster with every secret.

use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, RoleBinding, RoleRef, Subject,
};
use kube::api::ObjectMeta;
use serde_json::Value;

const RBAC_GROUP: &str = "rbac.authorization.k8s.io";
const WORK_AGENT_SA: &str = "klusterlet-work-sa";
const WORK_AGENT_NAMESPACE: &str = "open-cluster-management-agent";
const ROLE_PREFIX: &str = "open-cluster-management:klusterlet-work-sa:agent";
const EDIT_VERBS: [&str; 5] = ["create", "get", "list", "update", "delete"];

/// Cluster-wide edit grants for the work agent: (role suffix, api group, resource)
const CLUSTER_GRANTS: [(&str, &str, &str); 4] = [
    ("olm-edit", "operators.coreos.com", "operatorgroups"),
    ("volrepgroup-edit", "ramendr.openshift.io", "volumereplicationgroups"),
    ("mmode-edit", "ramendr.openshift.io", "maintenancemodes"),
    ("drclusterconfig-edit", "ramendr.openshift.io", "drclusterconfigs"),
];

/// The fixed role set granting the managed cluster's work agent access to DR
/// resources. Built once per pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessControlBundle {
    pub cluster_roles: Vec<ClusterRole>,
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    pub role_bindings: Vec<RoleBinding>,
}

impl AccessControlBundle {
    /// Bundle for a DR-cluster operator running in `operator_namespace`
    pub fn for_namespace(operator_namespace: &str) -> Self {
        let cluster_roles = CLUSTER_GRANTS
            .iter()
            .map(|(suffix, group, resource)| edit_cluster_role(suffix, group, resource))
            .collect();

        // The OLM role is granted through a namespaced binding instead
        let cluster_role_bindings = CLUSTER_GRANTS
            .iter()
            .filter(|(suffix, _, _)| *suffix != "olm-edit")
            .map(|(suffix, _, _)| cluster_role_binding(suffix))
            .collect();

        Self {
            cluster_roles,
            cluster_role_bindings,
            role_bindings: vec![olm_role_binding(operator_namespace)],
        }
    }

    /// All objects as manifests, roles before bindings
    pub fn manifests(&self) -> serde_json::Result<Vec<Value>> {
        self.cluster_roles
            .iter()
            .map(serde_json::to_value)
            .chain(self.cluster_role_bindings.iter().map(serde_json::to_value))
            .chain(self.role_bindings.iter().map(serde_json::to_value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cluster_roles.len() + self.cluster_role_bindings.len() + self.role_bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn role_name(suffix: &str) -> String {
    format!("{}:{}", ROLE_PREFIX, suffix)
}

fn work_agent_subject() -> Subject {
    Subject {
        kind: "ServiceAccount".to_string(),
        name: WORK_AGENT_SA.to_string(),
        namespace: Some(WORK_AGENT_NAMESPACE.to_string()),
        ..Default::default()
    }
}

fn cluster_role_ref(suffix: &str) -> RoleRef {
    RoleRef {
        api_group: RBAC_GROUP.to_string(),
        kind: "ClusterRole".to_string(),
        name: role_name(suffix),
    }
}

fn edit_cluster_role(suffix: &str, group: &str, resource: &str) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(role_name(suffix)),
            ..Default::default()
        },
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![group.to_string()]),
            resources: Some(vec![resource.to_string()]),
            verbs: EDIT_VERBS.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn cluster_role_binding(suffix: &str) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(role_name(suffix)),
            ..Default::default()
        },
        subjects: Some(vec![work_agent_subject()]),
        role_ref: cluster_role_ref(suffix),
    }
}

fn olm_role_binding(namespace: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(role_name("olm-edit")),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        subjects: Some(vec![work_agent_subject()]),
        role_ref: cluster_role_ref("olm-edit"),
    }
}
