// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::propagation::SecretFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("DRCluster '{cluster}' is not known")]
    UnknownCluster { cluster: String },

    #[error("missing profile name ({profile}) in config for DRCluster ({cluster})")]
    MissingProfile { profile: String, cluster: String },

    #[error("cannot add secret '{secret}' ({encoding}) to drcluster '{cluster}': {source}")]
    SecretPush {
        secret: String,
        cluster: String,
        encoding: SecretFormat,
        #[source]
        source: Box<DrError>,
    },

    #[error("unable to delete secret '{secret}' ({encoding}) from drcluster '{cluster}': {source}")]
    SecretRemove {
        secret: String,
        cluster: String,
        encoding: SecretFormat,
        #[source]
        source: Box<DrError>,
    },

    #[error("drpolicies list: {0}")]
    PolicyList(#[source] Box<DrError>),

    #[error("source secret {namespace}/{secret} unusable: {reason}")]
    SourceSecret {
        secret: String,
        namespace: String,
        reason: String,
    },

    #[error("finalizer error: {0}")]
    Finalizer(#[source] Box<kube::runtime::finalizer::Error<DrError>>),

    #[error("cannot encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl DrError {
    /// A cluster whose profile cannot be resolved to a secret.
    pub fn is_configuration_gap(&self) -> bool {
        matches!(
            self,
            DrError::UnknownCluster { .. } | DrError::MissingProfile { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DrError>;
