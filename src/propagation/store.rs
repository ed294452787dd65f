// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Contract for the object store that holds per-cluster secret state.

use crate::error::Result;
use crate::propagation::AccessControlBundle;
use crate::types::DRPolicy;
use async_trait::async_trait;
use std::fmt;

/// Physical representation of an S3 secret on a managed cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretFormat {
    /// The secret as the DR operator consumes it
    Native,
    /// Credentials file consumed by the backup/restore integration
    BackupTool,
}

impl SecretFormat {
    /// Short name used in object names and labels
    pub fn suffix(&self) -> &'static str {
        match self {
            SecretFormat::Native => "native",
            SecretFormat::BackupTool => "backup",
        }
    }
}

impl fmt::Display for SecretFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A format together with what it needs to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretEncoding {
    Native,
    BackupTool { namespace: String },
}

impl SecretEncoding {
    pub fn format(&self) -> SecretFormat {
        match self {
            SecretEncoding::Native => SecretFormat::Native,
            SecretEncoding::BackupTool { .. } => SecretFormat::BackupTool,
        }
    }

    /// Every encoding enabled by `backup_namespace`: native always, backup when configured
    pub fn enabled(backup_namespace: Option<&str>) -> Vec<SecretEncoding> {
        let mut encodings = vec![SecretEncoding::Native];
        if let Some(ns) = backup_namespace {
            encodings.push(SecretEncoding::BackupTool {
                namespace: ns.to_string(),
            });
        }
        encodings
    }
}

/// Everything needed to place one secret on one cluster
#[derive(Debug, Clone, Copy)]
pub struct SecretPlacement<'a> {
    pub secret: &'a str,
    pub cluster: &'a str,
    /// Hub namespace holding the source secret
    pub source_namespace: &'a str,
    /// Namespace of the DR operator on the managed cluster
    pub target_namespace: &'a str,
    pub bundle: &'a AccessControlBundle,
    pub encoding: &'a SecretEncoding,
}

/// External collaborator owning policy listing and secret placement.
///
/// Implementations must be idempotent: creating a present secret or
/// deleting an absent one succeeds.
#[async_trait]
pub trait ClusterSecretStore: Send + Sync {
    /// Fresh list of every DRPolicy
    async fn list_policies(&self) -> Result<Vec<DRPolicy>>;

    async fn create_or_update_secret(&self, placement: &SecretPlacement<'_>) -> Result<()>;

    async fn delete_secret(
        &self,
        secret: &str,
        cluster: &str,
        source_namespace: &str,
        format: SecretFormat,
    ) -> Result<()>;
}
