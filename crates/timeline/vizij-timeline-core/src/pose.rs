//! Pose values exchanged with the posing service.
//!
//! Field names serialize in PascalCase so documents round-trip through the
//! service's JSON unchanged. Only the bone map is interpreted by the core; the
//! remaining metadata is carried through as-is.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// Tolerance used when deciding whether a rotation is the identity.
const IDENTITY_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vec3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// Rotation quaternion stored as (x, y, z, w).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quat {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "one")]
    pub w: f32,
    #[serde(default)]
    pub is_identity: bool,
}

fn one() -> f32 {
    1.0
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
        is_identity: true,
    };

    /// Build a quaternion, deriving the identity flag from the components.
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        let is_identity = x.abs() <= IDENTITY_EPS
            && y.abs() <= IDENTITY_EPS
            && z.abs() <= IDENTITY_EPS
            && (w - 1.0).abs() <= IDENTITY_EPS;
        Self {
            x,
            y,
            z,
            w,
            is_identity,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[inline]
    pub fn from_array(q: [f32; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Position/rotation/scale of a single bone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoneTransform {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// A full actor pose as produced by `SavePose` and consumed by `LoadPose`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PoseDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default)]
    pub bones: HashMap<String, BoneTransform>,
    #[serde(default)]
    pub file_version: i32,
}

impl PoseDocument {
    /// Parse a document from the service's JSON.
    pub fn from_json(s: &str) -> Result<Self, TimelineError> {
        serde_json::from_str(s).map_err(|e| TimelineError::MalformedPose(e.to_string()))
    }

    /// Serialize to the compact JSON form the service expects.
    pub fn to_json(&self) -> Result<String, TimelineError> {
        serde_json::to_string(self).map_err(|e| TimelineError::MalformedPose(e.to_string()))
    }

    /// An empty document carrying only a bone map.
    pub fn with_bones(bones: HashMap<String, BoneTransform>) -> Self {
        Self {
            bones,
            ..Self::default()
        }
    }

    pub fn bone(&self, name: &str) -> Option<&BoneTransform> {
        self.bones.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Parse a possibly-missing JSON document, logging and discarding malformed input.
pub(crate) fn parse_or_log(json: Option<&str>, context: &str) -> Option<PoseDocument> {
    let json = json?;
    match PoseDocument::from_json(json) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!("{context}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_round_trip() {
        let json = r#"{
            "FileExtension": ".pose",
            "TypeName": "Ktisis Pose",
            "Position": {"X": 0, "Y": 0, "Z": 0},
            "Rotation": {"X": 0, "Y": 0, "Z": 0, "W": 1, "IsIdentity": true},
            "Bones": {
                "j_kosi": {
                    "Position": {"X": 1, "Y": 2, "Z": 3},
                    "Rotation": {"X": 0, "Y": 0, "Z": 0, "W": 1, "IsIdentity": true},
                    "Scale": {"X": 1, "Y": 1, "Z": 1}
                }
            },
            "FileVersion": 2
        }"#;
        let doc = PoseDocument::from_json(json).unwrap();
        assert_eq!(doc.file_version, 2);
        assert_eq!(doc.bone("j_kosi").unwrap().position, Vec3::new(1.0, 2.0, 3.0));

        let back = PoseDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_fields_fall_back_to_rest_values() {
        let doc = PoseDocument::from_json(r#"{"Bones": {"a": {}}}"#).unwrap();
        let bone = doc.bone("a").unwrap();
        assert_eq!(bone.scale, Vec3::ONE);
        assert_eq!(bone.rotation.w, 1.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = PoseDocument::from_json("{not json").unwrap_err();
        assert!(matches!(err, TimelineError::MalformedPose(_)));
        assert!(parse_or_log(Some("{not json"), "test").is_none());
    }

    #[test]
    fn identity_flag_is_derived() {
        assert!(Quat::new(0.0, 0.0, 0.0, 1.0).is_identity);
        assert!(!Quat::new(0.0, 0.7071, 0.0, 0.7071).is_identity);
    }
}
