//! Version publication planning.
//!
//! Publication splits into a pure planning step, validating the target
//! version against the repo's latest release and build and laying out the
//! exact sequence of `createVersion` calls, and an execution step walking
//! that plan. Placeholder builds backfill the gap when a fresh release is
//! published with a build number above one.

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider},
    rpc::types::Filter,
    sol_types::SolEvent,
};
use itertools::repeat_n;
use plugin_common::types::VersionTag;

use crate::{errors::ScriptError, solidity::PluginRepo::VersionCreated};

/// One `createVersion` call of a publication plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishStep {
    /// Publishes a placeholder build backfilling the gap below the target
    Placeholder,
    /// Publishes the real setup with its metadata
    Setup,
}

/// Validates the target version against the repo state and lays out the
/// sequence of publishes reaching it.
///
/// `latest_release` is the repo's highest release, `latest_build` the build
/// count of the target release. A fresh release published with a build
/// above one gets `build - 1` placeholder publishes first, so the real
/// setup lands at the requested build number.
pub fn plan_publication(
    latest_release: u8,
    latest_build: u16,
    target: VersionTag,
) -> Result<Vec<PublishStep>, ScriptError> {
    let next_release = latest_release as u16 + 1;
    if target.release as u16 > next_release || target.release < latest_release {
        return Err(ScriptError::Precondition(format!(
            "publishing release number {} is not possible, the latest release is {latest_release} and the next release you can publish is {next_release}",
            target.release,
        )));
    }

    if target.build == 0 {
        return Err(ScriptError::Precondition(
            "publishing build number 0 is not possible, builds are numbered from 1".to_string(),
        ));
    }

    if latest_build == 0 {
        // Nothing published under this release yet, backfill placeholders
        // up to the target build
        let placeholders = (target.build - 1) as usize;
        return Ok(repeat_n(PublishStep::Placeholder, placeholders)
            .chain(std::iter::once(PublishStep::Setup))
            .collect());
    }

    if target.build < latest_build {
        return Err(ScriptError::Precondition(format!(
            "publishing build number {} is not possible, the latest build is {latest_build}",
            target.build,
        )));
    }

    let next_build = latest_build as u32 + 1;
    if target.build as u32 > next_build {
        return Err(ScriptError::Precondition(format!(
            "publishing build number {} is not possible, the latest build is {latest_build} and the next build you can publish is {next_build}",
            target.build,
        )));
    }

    Ok(vec![PublishStep::Setup])
}

/// Whether the target version already exists among the repo's past
/// `VersionCreated` events
pub fn version_already_published(events: &[VersionCreated], target: VersionTag) -> bool {
    events
        .iter()
        .any(|event| event.release == target.release && event.build == target.build)
}

/// Fetches every `VersionCreated` event the repo has emitted
pub async fn past_version_created_events(
    repo: Address,
    provider: &DynProvider,
) -> Result<Vec<VersionCreated>, ScriptError> {
    let filter = Filter::new()
        .address(repo)
        .event_signature(VersionCreated::SIGNATURE_HASH)
        .from_block(0);

    let logs = provider
        .get_logs(&filter)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(logs
        .iter()
        .filter_map(|log| log.log_decode::<VersionCreated>().ok())
        .map(|log| log.inner.data)
        .collect())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes};
    use plugin_common::types::VersionTag;

    use super::{plan_publication, version_already_published, PublishStep, VersionCreated};

    fn tag(release: u8, build: u16) -> VersionTag {
        VersionTag::new(release, build)
    }

    fn version_event(release: u8, build: u16) -> VersionCreated {
        VersionCreated {
            release,
            build,
            pluginSetup: Address::ZERO,
            buildMetadata: Bytes::new(),
        }
    }

    #[test]
    fn test_first_build_of_first_release() {
        let plan = plan_publication(0, 0, tag(1, 1)).unwrap();
        assert_eq!(plan, vec![PublishStep::Setup]);
    }

    #[test]
    fn test_placeholder_backfill() {
        // Fresh release published straight at build 3
        let plan = plan_publication(1, 0, tag(1, 3)).unwrap();
        assert_eq!(
            plan,
            vec![
                PublishStep::Placeholder,
                PublishStep::Placeholder,
                PublishStep::Setup
            ],
        );
    }

    #[test]
    fn test_next_build() {
        let plan = plan_publication(1, 2, tag(1, 3)).unwrap();
        assert_eq!(plan, vec![PublishStep::Setup]);
    }

    #[test]
    fn test_current_build_passes_planning() {
        // Normally unreachable, the skip predicate fires first
        let plan = plan_publication(1, 2, tag(1, 2)).unwrap();
        assert_eq!(plan, vec![PublishStep::Setup]);
    }

    #[test]
    fn test_next_release() {
        let plan = plan_publication(1, 0, tag(2, 1)).unwrap();
        assert_eq!(plan, vec![PublishStep::Setup]);

        let plan = plan_publication(1, 0, tag(2, 5)).unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[4], PublishStep::Setup);
        assert!(plan[..4]
            .iter()
            .all(|step| *step == PublishStep::Placeholder));
    }

    #[test]
    fn test_rejects_release_gap() {
        assert!(plan_publication(1, 0, tag(3, 1)).is_err());
    }

    #[test]
    fn test_rejects_release_below_latest() {
        assert!(plan_publication(2, 0, tag(1, 5)).is_err());
    }

    #[test]
    fn test_rejects_build_zero() {
        assert!(plan_publication(1, 0, tag(1, 0)).is_err());
        assert!(plan_publication(0, 0, tag(1, 0)).is_err());
    }

    #[test]
    fn test_rejects_build_below_latest() {
        assert!(plan_publication(1, 3, tag(1, 2)).is_err());
    }

    #[test]
    fn test_rejects_build_gap() {
        assert!(plan_publication(1, 2, tag(1, 4)).is_err());
    }

    #[test]
    fn test_version_already_published() {
        let events = vec![version_event(1, 1), version_event(1, 2)];

        assert!(version_already_published(&events, tag(1, 1)));
        assert!(version_already_published(&events, tag(1, 2)));
        assert!(!version_already_published(&events, tag(1, 3)));
        assert!(!version_already_published(&events, tag(2, 1)));
        assert!(!version_already_published(&[], tag(1, 1)));
    }
}
