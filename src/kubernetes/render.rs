// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Renders hub S3 secrets into the objects shipped to a managed cluster.

use crate::constants::{labels, s3_keys, OPERATOR_NAME};
use crate::error::{DrError, Result};
use crate::propagation::{SecretEncoding, SecretFormat, SecretPlacement};
use crate::types::{
    DeleteOption, ManifestWork, ManifestWorkSpec, ManifestsTemplate, OrphaningRule,
    PropagationPolicy, SelectivelyOrphan,
};
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::ByteString;
use kube::{api::ObjectMeta, Resource, ResourceExt};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the ManifestWork carrying `secret` in `format`
pub fn manifestwork_name(secret: &str, format: SecretFormat) -> String {
    format!("{}-{}-{}", OPERATOR_NAME, secret, format.suffix())
}

/// Render the hub secret in the placement's encoding
pub fn render_secret(source: &Secret, placement: &SecretPlacement<'_>) -> Result<Secret> {
    match placement.encoding {
        SecretEncoding::Native => Ok(Secret {
            metadata: ObjectMeta {
                name: Some(placement.secret.to_string()),
                namespace: Some(placement.target_namespace.to_string()),
                labels: source.metadata.labels.clone(),
                ..Default::default()
            },
            data: source.data.clone(),
            string_data: source.string_data.clone(),
            type_: source.type_.clone(),
            immutable: None,
        }),
        SecretEncoding::BackupTool { namespace } => {
            let access_key = secret_value(source, s3_keys::ACCESS_KEY_ID)?;
            let secret_key = secret_value(source, s3_keys::SECRET_ACCESS_KEY)?;
            let credentials = format!(
                "[default]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
                access_key, secret_key
            );

            Ok(Secret {
                metadata: ObjectMeta {
                    name: Some(placement.secret.to_string()),
                    namespace: Some(namespace.clone()),
                    ..Default::default()
                },
                data: Some(BTreeMap::from([(
                    s3_keys::BACKUP_CREDENTIALS.to_string(),
                    ByteString(credentials.into_bytes()),
                )])),
                type_: Some("Opaque".to_string()),
                ..Default::default()
            })
        }
    }
}

/// Look a key up in `data`, falling back to `stringData`
fn secret_value(source: &Secret, key: &str) -> Result<String> {
    let from_data = source
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|v| String::from_utf8(v.0.clone()));

    match from_data {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(source_error(source, format!("key {} is not UTF-8: {}", key, e))),
        None => source
            .string_data
            .as_ref()
            .and_then(|d| d.get(key))
            .cloned()
            .ok_or_else(|| source_error(source, format!("missing key {}", key))),
    }
}

fn source_error(source: &Secret, reason: String) -> DrError {
    DrError::SourceSecret {
        secret: source.name_any(),
        namespace: source.namespace().unwrap_or_default(),
        reason,
    }
}

/// Rule keeping `obj` on the managed cluster when its work is deleted
fn orphan_rule<K: Resource<DynamicType = ()>>(obj: &K) -> OrphaningRule {
    OrphaningRule {
        group: K::group(&()).to_string(),
        resource: K::plural(&()).to_string(),
        namespace: obj.namespace().unwrap_or_default(),
        name: obj.name_any(),
    }
}

/// Wrap the rendered secret, its namespaces and the RBAC bundle into one
/// ManifestWork living in the cluster's hub namespace.
///
/// Namespaces and RBAC objects are shared by every secret on the cluster and
/// are orphaned on deletion, so removing the work only removes the secret.
pub fn build_manifestwork(
    placement: &SecretPlacement<'_>,
    rendered: &Secret,
) -> Result<ManifestWork> {
    let format = placement.encoding.format();
    let name = manifestwork_name(placement.secret, format);
    let bundle = placement.bundle;

    let namespaces: Vec<Namespace> = [
        Some(placement.target_namespace.to_string()),
        rendered.namespace(),
    ]
    .into_iter()
    .flatten()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(|ns| Namespace {
        metadata: ObjectMeta {
            name: Some(ns),
            ..Default::default()
        },
        ..Default::default()
    })
    .collect();

    let mut manifests = namespaces
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    manifests.extend(bundle.manifests()?);
    manifests.push(serde_json::to_value(rendered)?);

    let orphaning_rules = namespaces
        .iter()
        .map(orphan_rule)
        .chain(bundle.cluster_roles.iter().map(orphan_rule))
        .chain(bundle.cluster_role_bindings.iter().map(orphan_rule))
        .chain(bundle.role_bindings.iter().map(orphan_rule))
        .collect();

    let mut work = ManifestWork::new(
        &name,
        ManifestWorkSpec {
            workload: ManifestsTemplate { manifests },
            delete_option: Some(DeleteOption {
                propagation_policy: PropagationPolicy::SelectivelyOrphan,
                selectively_orphans: Some(SelectivelyOrphan { orphaning_rules }),
            }),
        },
    );
    work.metadata.namespace = Some(placement.cluster.to_string());
    work.metadata.labels = Some(BTreeMap::from([
        (labels::MANAGED_BY.to_string(), OPERATOR_NAME.to_string()),
        (labels::SECRET.to_string(), placement.secret.to_string()),
        (labels::FORMAT.to_string(), format.suffix().to_string()),
        (
            labels::SOURCE_NAMESPACE.to_string(),
            placement.source_namespace.to_string(),
        ),
    ]));
    Ok(work)
}
