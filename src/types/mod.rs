// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resources and value types shared across the operator.

pub mod drcluster;
pub mod manifestwork;
pub mod names;
pub mod policy;

pub use drcluster::{DRCluster, DRClusterSpec};
pub use manifestwork::{
    DeleteOption, ManifestWork, ManifestWorkSpec, ManifestsTemplate, OrphaningRule,
    PropagationPolicy, SelectivelyOrphan,
};
pub use names::NameSet;
pub use policy::{DRPolicy, DRPolicySpec};
