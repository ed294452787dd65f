// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{GROUP, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Kinds that must be served before the reconciler can start
const REQUIRED_KINDS: [&str; 2] = ["DRPolicy", "DRCluster"];

/// Wait for the DRPolicy and DRCluster CRDs to become available.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_dr_crds(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match missing_dr_kinds(client).await {
            Ok(missing) if missing.is_empty() => {
                info!("DR CRDs ({}/v1alpha1) are available", GROUP);
                return Ok(());
            }
            Ok(missing) => {
                info!(
                    "DR CRDs not yet available (missing: {}), waiting {} seconds...",
                    missing.join(", "),
                    interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for DR CRDs: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Kinds from REQUIRED_KINDS that discovery does not report yet
async fn missing_dr_kinds(client: &Client) -> Result<Vec<&'static str>> {
    let discovery = Discovery::new(client.clone())
        .filter(&[GROUP])
        .run()
        .await?;

    let served: Vec<String> = discovery
        .groups()
        .filter(|g| g.name() == GROUP)
        .flat_map(|g| g.recommended_resources())
        .filter(|(ar, _)| ar.version == "v1alpha1")
        .map(|(ar, _)| ar.kind)
        .collect();

    Ok(REQUIRED_KINDS
        .into_iter()
        .filter(|kind| !served.iter().any(|s| s == kind))
        .collect())
}
