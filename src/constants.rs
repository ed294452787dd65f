// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "drpolicy-secrets";

/// Finalizer placed on every DRPolicy so secrets are reclaimed before deletion
pub const POLICY_FINALIZER: &str = "drpolicies.ramendr.openshift.io/secret-propagation";

/// Namespace defaults
pub mod namespaces {
    /// Hub operator namespace when POD_NAMESPACE is unset
    pub const DEFAULT_OPERATOR_NAMESPACE: &str = "ramen-system";
    /// DR-cluster operator namespace when the config leaves it empty
    pub const DEFAULT_DR_CLUSTER_OPERATOR_NAMESPACE: &str = "ramen-system";
}

/// Labels stamped on generated ManifestWorks
pub mod labels {
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    pub const SECRET: &str = "drpolicy-secrets.ramendr.io/secret";
    pub const FORMAT: &str = "drpolicy-secrets.ramendr.io/format";
    pub const SOURCE_NAMESPACE: &str = "drpolicy-secrets.ramendr.io/source-namespace";
}

/// Keys expected in an S3 profile secret
pub mod s3_keys {
    pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    /// Key holding the credentials file in the backup-tool encoding
    pub const BACKUP_CREDENTIALS: &str = "cloud";
}

/// CRD polling configuration
pub mod crd {
    /// API group of DRPolicy and DRCluster
    pub const GROUP: &str = "ramendr.openshift.io";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Requeue delay after a failed reconciliation
pub const ERROR_REQUEUE_SECS: u64 = 60;
