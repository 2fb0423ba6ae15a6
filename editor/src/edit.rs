//! Replay handlers for scene edits.
//!
//! Every property edit uses the same layout: layer [`BEFORE`] holds the old
//! value per object, layer [`AFTER`] the new one. Transform edits use three
//! before/after pairs (position, rotation, scale). Structural edits keep the
//! touched handles as a global list plus each object's root index.

use gantry_core::ObjectHandle;
use gantry_core::math::{Quat, Vec3};
use gantry_core::undo::{EditActionError, EditActionResult, FromValue, RecordData, RecordHandler};

use crate::scene::{GameObject, Scene};

pub const BEFORE: usize = 0;
pub const AFTER: usize = 1;

/// Transform layers: `POSITION + BEFORE`, `POSITION + AFTER`, and so on.
pub const POSITION: usize = 0;
pub const ROTATION: usize = 2;
pub const SCALE: usize = 4;
pub const TRANSFORM_LAYERS: usize = 6;

/// Structural layers: the handle list under `NULL`, then root index per object.
pub const OBJECTS: usize = 0;
pub const ROOT_INDEX: usize = 1;

/// What a scene record replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEdit {
    Rename,
    SetTransform,
    SetCameraFov,
    SetTags,
    SetActive,
    /// Objects spawned by the action. Undo detaches them; discard destroys
    /// them, since nothing can bring them back.
    CreateObject,
    /// Objects removed from the scene. Undo reattaches them at their old
    /// root indices.
    DeleteObjects,
}

impl SceneEdit {
    fn apply_side(&self, data: &RecordData, side: usize, scene: &mut Scene) -> EditActionResult {
        match self {
            Self::Rename => apply_each(data, side, scene, |object, name: String| {
                object.name = name;
                Ok(())
            }),
            Self::SetTransform => {
                apply_each(data, POSITION + side, scene, |object, position: Vec3| {
                    object.transform.position = position;
                    Ok(())
                })?;
                apply_each(data, ROTATION + side, scene, |object, rotation: Quat| {
                    object.transform.rotation = rotation;
                    Ok(())
                })?;
                apply_each(data, SCALE + side, scene, |object, scale: Vec3| {
                    object.transform.scale = scale;
                    Ok(())
                })
            }
            Self::SetCameraFov => apply_each(data, side, scene, |object, fov: f32| {
                let camera = object.camera.as_mut().ok_or_else(|| {
                    EditActionError::InvalidState(format!("'{}' has no camera", object.name))
                })?;
                camera.fov = fov;
                Ok(())
            }),
            Self::SetTags => apply_each(data, side, scene, |object, tags: Vec<String>| {
                object.tags = tags;
                Ok(())
            }),
            Self::SetActive => apply_each(data, side, scene, |object, active: bool| {
                object.active = active;
                Ok(())
            }),
            Self::CreateObject => {
                if side == AFTER {
                    attach_all(data, scene)
                } else {
                    detach_all(data, scene)
                }
            }
            Self::DeleteObjects => {
                if side == AFTER {
                    detach_all(data, scene)
                } else {
                    attach_all(data, scene)
                }
            }
        }
    }
}

impl RecordHandler<Scene> for SceneEdit {
    fn undo(&mut self, data: &RecordData, scene: &mut Scene) -> EditActionResult {
        self.apply_side(data, BEFORE, scene)
    }

    fn redo(&mut self, data: &RecordData, scene: &mut Scene) -> EditActionResult {
        self.apply_side(data, AFTER, scene)
    }

    fn discard(&mut self, data: &RecordData, scene: &mut Scene) -> EditActionResult {
        if *self == Self::CreateObject {
            for handle in touched_objects(data)? {
                // A stale handle was already destroyed by someone else.
                if scene.is_alive(handle) {
                    scene.destroy(handle);
                }
            }
        }
        Ok(())
    }
}

/// Writes the snapshot of every object stored in `layer`.
fn apply_each<V: FromValue>(
    data: &RecordData,
    layer: usize,
    scene: &mut Scene,
    mut apply: impl FnMut(&mut GameObject, V) -> EditActionResult,
) -> EditActionResult {
    let handles: Vec<ObjectHandle> = data.try_layer(layer)?.handles().collect();
    for handle in handles {
        let value = data.get_as::<V>(layer, handle)?;
        apply(scene.get_mut(handle)?, value)?;
    }
    Ok(())
}

/// The handle list of a structural record, in ascending root-index order.
pub fn touched_objects(data: &RecordData) -> EditActionResult<Vec<ObjectHandle>> {
    data.get_as::<Vec<ObjectHandle>>(OBJECTS, ObjectHandle::NULL)
}

fn attach_all(data: &RecordData, scene: &mut Scene) -> EditActionResult {
    let handles = touched_objects(data)?;
    // Validate up front so a stale handle leaves the scene untouched.
    for handle in &handles {
        data.get_as::<i32>(ROOT_INDEX, *handle)?;
        if !scene.is_alive(*handle) {
            return Err(EditActionError::InvalidHandle(*handle));
        }
    }
    for handle in handles {
        let index = data.get_as::<i32>(ROOT_INDEX, handle)?;
        scene.attach_at(handle, usize::try_from(index).unwrap_or(0))?;
    }
    Ok(())
}

fn detach_all(data: &RecordData, scene: &mut Scene) -> EditActionResult {
    for handle in touched_objects(data)? {
        if scene.detach(handle).is_none() {
            log::warn!("Replay: {handle} was not attached");
        }
    }
    Ok(())
}

/// Fills a structural record for `objects`, sorted by root index.
///
/// Objects that are not attached are skipped. Returns the handles in the
/// order they were stored.
pub fn record_structure(
    data: &mut RecordData,
    scene: &Scene,
    objects: &[ObjectHandle],
) -> Vec<ObjectHandle> {
    let mut placed: Vec<(usize, ObjectHandle)> = objects
        .iter()
        .filter_map(|h| scene.root_index(*h).map(|i| (i, *h)))
        .collect();
    placed.sort_unstable();
    placed.dedup();

    data.resize(2);
    for (index, handle) in &placed {
        data.set(ROOT_INDEX, *handle, *index as i32);
    }
    let handles: Vec<ObjectHandle> = placed.into_iter().map(|(_, h)| h).collect();
    data.set_global(OBJECTS, handles.clone());
    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Camera;

    fn scene_with(names: &[&str]) -> (Scene, Vec<ObjectHandle>) {
        let mut scene = Scene::new();
        let handles = names
            .iter()
            .map(|n| scene.spawn(GameObject::new(*n)))
            .collect();
        (scene, handles)
    }

    #[test]
    fn rename_round_trip() {
        let (mut scene, h) = scene_with(&["A"]);
        let mut data = RecordData::default();
        data.resize(2);
        data.set(BEFORE, h[0], "A");
        data.set(AFTER, h[0], "Player");

        let mut edit = SceneEdit::Rename;
        edit.redo(&data, &mut scene).unwrap();
        assert_eq!(scene.get(h[0]).unwrap().name, "Player");
        edit.undo(&data, &mut scene).unwrap();
        assert_eq!(scene.get(h[0]).unwrap().name, "A");
    }

    #[test]
    fn fov_on_object_without_camera_fails() {
        let (mut scene, h) = scene_with(&["A"]);
        let mut data = RecordData::default();
        data.resize(2);
        data.set(BEFORE, h[0], 60.0f32);
        data.set(AFTER, h[0], 75.0f32);

        assert!(matches!(
            SceneEdit::SetCameraFov.redo(&data, &mut scene),
            Err(EditActionError::InvalidState(_))
        ));

        scene.get_mut(h[0]).unwrap().camera = Some(Camera::default());
        SceneEdit::SetCameraFov.redo(&data, &mut scene).unwrap();
        assert_eq!(scene.get(h[0]).unwrap().camera.unwrap().fov, 75.0);
    }

    #[test]
    fn wrong_value_shape_is_reported() {
        let (mut scene, h) = scene_with(&["A"]);
        let mut data = RecordData::default();
        data.resize(2);
        data.set(AFTER, h[0], 3i32);

        assert!(matches!(
            SceneEdit::SetActive.redo(&data, &mut scene),
            Err(EditActionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn delete_undo_restores_root_order() {
        let (mut scene, h) = scene_with(&["A", "B", "C", "D"]);
        let mut data = RecordData::default();
        let stored = record_structure(&mut data, &scene, &[h[3], h[1]]);
        assert_eq!(stored, vec![h[1], h[3]]);

        let mut edit = SceneEdit::DeleteObjects;
        edit.redo(&data, &mut scene).unwrap();
        assert_eq!(scene.roots(), &[h[0], h[2]]);

        edit.undo(&data, &mut scene).unwrap();
        assert_eq!(scene.roots(), &[h[0], h[1], h[2], h[3]]);
    }

    #[test]
    fn discarded_creation_destroys_objects() {
        let (mut scene, h) = scene_with(&["A", "New"]);
        let mut data = RecordData::default();
        record_structure(&mut data, &scene, &[h[1]]);

        let mut edit = SceneEdit::CreateObject;
        edit.undo(&data, &mut scene).unwrap();
        assert_eq!(scene.roots(), &[h[0]]);
        assert!(scene.is_alive(h[1]));

        edit.discard(&data, &mut scene).unwrap();
        assert!(!scene.is_alive(h[1]));
        assert_eq!(scene.take_destroyed(), vec![h[1]]);
    }

    #[test]
    fn attach_of_stale_handle_leaves_scene_untouched() {
        let (mut scene, h) = scene_with(&["A", "B"]);
        let mut data = RecordData::default();
        record_structure(&mut data, &scene, &[h[0], h[1]]);
        scene.detach(h[0]);
        scene.destroy(h[1]);

        assert_eq!(
            SceneEdit::DeleteObjects.undo(&data, &mut scene),
            Err(EditActionError::InvalidHandle(h[1]))
        );
        assert!(scene.roots().is_empty());
    }
}
