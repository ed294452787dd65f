// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use drpolicy_secrets::config::Config;
use drpolicy_secrets::kubernetes::{wait_for_dr_crds, KubeSecretStore};
use drpolicy_secrets::propagation::{SecretPropagator, SerialGuard};
use drpolicy_secrets::reconcilers::PolicyReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting drpolicy-secrets operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: operator_namespace={}, distribution_enabled={}, \
         backup_namespace={:?}, profiles={}",
        config.operator_namespace,
        config.propagation.distribution_enabled(),
        config.propagation.backup_namespace(),
        config.propagation.s3_store_profiles.len()
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the DR CRDs before starting the reconciler
    info!("Waiting for DRPolicy and DRCluster CRDs to become available...");
    wait_for_dr_crds(&client).await?;

    // One guard serializes every deploy and undeploy pass in this process
    let store = Arc::new(KubeSecretStore::new(client.clone()));
    let propagator = SecretPropagator::new(store, Arc::new(SerialGuard::new()), config);
    let reconciler = PolicyReconciler::new(client, propagator);

    info!("Starting drpolicy reconciler...");
    reconciler.run().await?;

    // This should never be reached as the reconciler runs forever
    warn!("DRPolicy reconciler stopped unexpectedly");
    Ok(())
}
