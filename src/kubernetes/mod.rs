// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and the ManifestWork-backed secret store.

pub mod crd;
pub mod render;
pub mod store;

pub use crd::wait_for_dr_crds;
pub use store::KubeSecretStore;
