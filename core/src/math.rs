//! Math type aliases for snapshot values.
//!
//! All editor-facing math is single precision.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a local TRS matrix (translation * rotation * scale).
///
/// `rotation` is renormalized, so slightly drifted quaternions coming back
/// from an inspector widget are accepted.
pub fn mat4_from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    let rotation = nalgebra::UnitQuaternion::from_quaternion(rotation);
    Mat4::new_translation(&translation)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(&scale)
}

/// Rotation of `angle` radians around the Y axis.
pub fn quat_from_rotation_y(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), angle).into_inner()
}
