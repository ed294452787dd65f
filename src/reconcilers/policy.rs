// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DRPolicy reconciler - deploys S3 secrets on apply and reclaims them on delete.

use crate::constants::{ERROR_REQUEUE_SECS, POLICY_FINALIZER};
use crate::error::{DrError, Result};
use crate::propagation::SecretPropagator;
use crate::types::{DRCluster, DRPolicy};
use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::Action,
        finalizer::{finalizer, Event as Finalizer},
        reflector::ObjectRef,
        Controller,
    },
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct PolicyReconciler {
    client: Client,
    propagator: SecretPropagator,
}

impl PolicyReconciler {
    pub fn new(client: Client, propagator: SecretPropagator) -> Self {
        Self { client, propagator }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let policies: Api<DRPolicy> = Api::all(self.client.clone());
        let drclusters: Api<DRCluster> = Api::all(self.client.clone());

        let controller = Controller::new(policies, WatcherConfig::default());
        let policy_store = controller.store();
        let context = Arc::new(self);

        controller
            // A profile change on a DRCluster must be re-pushed for every policy spanning it
            .watches(drclusters, WatcherConfig::default(), move |cluster| {
                policies_spanning(&policy_store.state(), &cluster.name_any())
            })
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled drpolicy: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    async fn list_clusters(&self) -> Result<Vec<DRCluster>> {
        let drclusters: Api<DRCluster> = Api::all(self.client.clone());
        Ok(drclusters.list(&ListParams::default()).await?.items)
    }

    async fn apply(&self, policy: &DRPolicy) -> Result<Action> {
        let clusters = self.list_clusters().await?;
        let report = self.propagator.deploy(policy, &clusters).await?;

        for gap in &report.unresolved {
            warn!("DRPolicy {} deployed partially: {}", policy.name_any(), gap);
        }
        info!(
            "DRPolicy {} reconciled, {} secret placement(s) pushed",
            policy.name_any(),
            report.pushed
        );

        Ok(Action::await_change())
    }

    async fn cleanup(&self, policy: &DRPolicy) -> Result<Action> {
        let clusters = self.list_clusters().await?;
        let report = self.propagator.undeploy(policy, &clusters).await?;

        info!(
            "DRPolicy {} cleaned up, {} secret(s) removed, {} still in use",
            policy.name_any(),
            report.removed,
            report.retained
        );

        Ok(Action::await_change())
    }
}

/// References to every cached policy that spans `cluster_name`
pub fn policies_spanning(
    policies: &[Arc<DRPolicy>],
    cluster_name: &str,
) -> Vec<ObjectRef<DRPolicy>> {
    policies
        .iter()
        .filter(|p| p.contains_cluster(cluster_name))
        .map(|p| ObjectRef::from_obj(p.as_ref()))
        .collect()
}

async fn reconcile(policy: Arc<DRPolicy>, ctx: Arc<PolicyReconciler>) -> Result<Action> {
    debug!("Reconciling drpolicy: {}", policy.name_any());

    let policies: Api<DRPolicy> = Api::all(ctx.client.clone());
    finalizer(&policies, POLICY_FINALIZER, policy, |event| async move {
        match event {
            Finalizer::Apply(p) => ctx.apply(&p).await,
            Finalizer::Cleanup(p) => ctx.cleanup(&p).await,
        }
    })
    .await
    .map_err(|e| DrError::Finalizer(Box::new(e)))
}

fn error_policy(_policy: Arc<DRPolicy>, error: &DrError, _ctx: Arc<PolicyReconciler>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}
