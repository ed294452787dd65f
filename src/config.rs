// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::namespaces::{
    DEFAULT_DR_CLUSTER_OPERATOR_NAMESPACE, DEFAULT_OPERATOR_NAMESPACE,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Hub namespace holding the source S3 secrets
    pub operator_namespace: String,
    pub propagation: PropagationConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let operator_namespace =
            env::var("POD_NAMESPACE").unwrap_or_else(|_| DEFAULT_OPERATOR_NAMESPACE.to_string());
        let path = env::var("DRPOLICY_SECRETS_CONFIG")
            .context("DRPOLICY_SECRETS_CONFIG environment variable not set")?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path))?;

        let mut config = Self::from_yaml_str(&raw)?;
        config.operator_namespace = operator_namespace;
        Ok(config)
    }

    /// Parse the propagation document, using the default operator namespace
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let propagation: PropagationConfig =
            serde_yaml::from_str(raw).context("Failed to parse propagation config")?;

        Ok(Config {
            operator_namespace: DEFAULT_OPERATOR_NAMESPACE.to_string(),
            propagation,
        })
    }
}

/// Feature flags, namespaces and the S3 profile directory
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PropagationConfig {
    pub deployment_automation_enabled: bool,
    pub s3_secret_distribution_enabled: bool,
    pub dr_cluster_operator_namespace: Option<String>,
    pub backup_integration: BackupIntegration,
    pub s3_store_profiles: Vec<S3StoreProfile>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupIntegration {
    pub enabled: bool,
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct S3StoreProfile {
    pub s3_profile_name: String,
    pub s3_secret_ref: SecretRef,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SecretRef {
    pub name: String,
}

impl PropagationConfig {
    /// Both automation and S3 secret distribution must be switched on
    pub fn distribution_enabled(&self) -> bool {
        self.deployment_automation_enabled && self.s3_secret_distribution_enabled
    }

    /// Target namespace of the backup-tool encoding, when that encoding is produced
    pub fn backup_namespace(&self) -> Option<&str> {
        let ns = self.backup_integration.namespace.as_str();
        (self.backup_integration.enabled && !ns.is_empty()).then_some(ns)
    }

    pub fn dr_cluster_operator_namespace(&self) -> &str {
        match self.dr_cluster_operator_namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => DEFAULT_DR_CLUSTER_OPERATOR_NAMESPACE,
        }
    }
}
