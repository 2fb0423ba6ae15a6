//! Minimal scene model edited through history.
//!
//! A [`Scene`] owns a flat list of root objects. Deleting an object from the
//! editor only *detaches* it from the root list so the delete can be undone;
//! the object is destroyed for good once no history record can bring it back.

use std::collections::HashMap;

use gantry_core::math::{Mat4, Quat, Vec3, mat4_from_trs};
use gantry_core::undo::{EditActionError, EditActionResult, Editable};
use gantry_core::{HandleAllocator, ObjectHandle};

/// Local position, rotation and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        mat4_from_trs(self.position, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Perspective camera component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { fov: 60.0 }
    }
}

/// One editable scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    pub name: String,
    pub transform: Transform,
    pub camera: Option<Camera>,
    pub tags: Vec<String>,
    pub active: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            camera: None,
            tags: Vec::new(),
            active: true,
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }
}

/// Flat scene of root objects addressed by [`ObjectHandle`].
#[derive(Debug, Default)]
pub struct Scene {
    handles: HandleAllocator,
    objects: HashMap<ObjectHandle, GameObject>,
    roots: Vec<ObjectHandle>,
    /// Handles destroyed since the last [`Scene::take_destroyed`].
    destroyed: Vec<ObjectHandle>,
}

impl Editable for Scene {}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `object` at the end of the root list.
    pub fn spawn(&mut self, object: GameObject) -> ObjectHandle {
        let handle = self.handles.allocate();
        log::trace!("Scene: spawned '{}' as {handle}", object.name);
        self.objects.insert(handle, object);
        self.roots.push(handle);
        handle
    }

    /// Destroys an object permanently and releases its handle.
    ///
    /// Returns the object, or `None` if the handle was stale.
    pub fn destroy(&mut self, handle: ObjectHandle) -> Option<GameObject> {
        if !self.handles.is_alive(handle) {
            return None;
        }
        self.detach(handle);
        self.handles.release(handle);
        let object = self.objects.remove(&handle);
        self.destroyed.push(handle);
        log::trace!("Scene: destroyed {handle}");
        object
    }

    /// Drains the handles destroyed since the last call, so the owner can
    /// flag them in its history's deleted-object registry.
    pub fn take_destroyed(&mut self) -> Vec<ObjectHandle> {
        std::mem::take(&mut self.destroyed)
    }

    /// Removes an object from the root list without destroying it.
    ///
    /// Returns the root index it occupied, or `None` if it was not attached.
    pub fn detach(&mut self, handle: ObjectHandle) -> Option<usize> {
        let index = self.root_index(handle)?;
        self.roots.remove(index);
        Some(index)
    }

    /// Re-inserts a detached object into the root list at `index`
    /// (clamped to the list length).
    pub fn attach_at(&mut self, handle: ObjectHandle, index: usize) -> EditActionResult {
        self.handles.validate(handle)?;
        if self.roots.contains(&handle) {
            return Err(EditActionError::InvalidState(format!(
                "{handle} is already attached"
            )));
        }
        let index = index.min(self.roots.len());
        self.roots.insert(index, handle);
        Ok(())
    }

    pub fn root_index(&self, handle: ObjectHandle) -> Option<usize> {
        self.roots.iter().position(|h| *h == handle)
    }

    pub fn is_attached(&self, handle: ObjectHandle) -> bool {
        self.root_index(handle).is_some()
    }

    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.handles.is_alive(handle)
    }

    pub fn roots(&self) -> &[ObjectHandle] {
        &self.roots
    }

    /// Live objects that are not in the root list.
    pub fn detached(&self) -> Vec<ObjectHandle> {
        let mut detached: Vec<_> = self
            .objects
            .keys()
            .copied()
            .filter(|h| !self.roots.contains(h))
            .collect();
        detached.sort_unstable();
        detached
    }

    pub fn get(&self, handle: ObjectHandle) -> EditActionResult<&GameObject> {
        self.handles.validate(handle)?;
        self.objects
            .get(&handle)
            .ok_or(EditActionError::InvalidHandle(handle))
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> EditActionResult<&mut GameObject> {
        self.handles.validate(handle)?;
        self.objects
            .get_mut(&handle)
            .ok_or(EditActionError::InvalidHandle(handle))
    }

    /// Number of live objects, attached or not.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First attached object named `name`.
    pub fn find(&self, name: &str) -> Option<ObjectHandle> {
        self.roots
            .iter()
            .copied()
            .find(|h| self.objects.get(h).is_some_and(|o| o.name == name))
    }
}
