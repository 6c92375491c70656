use std::collections::BTreeMap;

use serde::Serialize;

use crate::provision::WorkUnitSpec;

const CONTAINER_NAME: &str = "churn-echo";
const PULL_IF_NOT_PRESENT: &str = "IfNotPresent";

/// Minimal `v1/Pod` body for one work unit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PodManifest<'spec> {
    api_version: &'static str,
    kind: &'static str,
    metadata: ObjectMeta<'spec>,
    spec: PodSpec<'spec>,
}

#[derive(Debug, Serialize)]
struct ObjectMeta<'spec> {
    name: &'spec str,
    namespace: &'spec str,
    labels: &'spec BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodSpec<'spec> {
    containers: [Container<'spec>; 1],
    scheduler_name: &'spec str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Container<'spec> {
    name: &'static str,
    image: &'spec str,
    command: &'spec [String],
    image_pull_policy: &'static str,
}

impl<'spec> PodManifest<'spec> {
    pub(super) fn for_unit(
        unit: &'spec WorkUnitSpec,
        image: &'spec str,
        scheduler_name: &'spec str,
    ) -> Self {
        Self {
            api_version: "v1",
            kind: "Pod",
            metadata: ObjectMeta {
                name: &unit.name,
                namespace: &unit.scope,
                labels: &unit.labels,
            },
            spec: PodSpec {
                containers: [Container {
                    name: CONTAINER_NAME,
                    image,
                    command: &unit.command,
                    image_pull_policy: PULL_IF_NOT_PRESENT,
                }],
                scheduler_name,
            },
        }
    }
}

/// `DeleteOptions` asking for immediate removal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteOptions {
    api_version: &'static str,
    kind: &'static str,
    grace_period_seconds: u64,
}

impl DeleteOptions {
    pub(super) const fn immediate() -> Self {
        Self {
            api_version: "v1",
            kind: "DeleteOptions",
            grace_period_seconds: 0,
        }
    }
}
