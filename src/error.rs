use thiserror::Error;

use crate::{physics::PhysicsError, vehicle::PartRole};

/// Failure of one rig-build attempt. Nothing built by the attempt is ever registered.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("asset is missing required parts: {}", format_roles(.0))]
    MissingParts(Vec<PartRole>),
    #[error("part `{0}` has no vertices to build a convex hull from")]
    EmptyHull(&'static str),
    #[error("physics world rejected the rig: {0}")]
    Physics(#[from] PhysicsError),
    #[error("failed to load vehicle asset: {0}")]
    Asset(String),
    #[error("construction task ended without reporting a result")]
    TaskLost,
    #[error("rig {0} could not be registered")]
    Unregistered(u64),
}

fn format_roles(roles: &[PartRole]) -> String {
    roles
        .iter()
        .map(|role| role.part_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::WheelRole;

    #[test]
    fn test_missing_parts_lists_every_role() {
        let err = ConstructionError::MissingParts(vec![
            PartRole::Chassis,
            PartRole::Wheel(WheelRole::BackRight),
        ]);
        assert_eq!(
            err.to_string(),
            "asset is missing required parts: body, wheel_backRight"
        );
    }
}
