//! Editing session: a scene, its history and the verbs that record into it.
//!
//! Every verb follows the same protocol: capture the "before" values, mutate
//! the live scene once, capture the "after" values and push the record.
//! History never replays an action at record time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gantry_core::ObjectHandle;
use gantry_core::undo::{ActionRecord, EditActionError, HistoryStack, RecordId};

use crate::edit::{self, AFTER, BEFORE, SceneEdit};
use crate::error::EditorError;
use crate::history_panel::{self, HistoryRow};
use crate::menu::{EditMenu, MenuAction};
use crate::scene::{GameObject, Scene, Transform};
use crate::settings::EditorSettings;

/// An in-progress FOV drag that is being coalesced into one record.
#[derive(Debug, Clone, Copy)]
struct FovDrag {
    camera: ObjectHandle,
    /// FOV before the drag started.
    origin: f32,
    record: RecordId,
}

pub struct EditorSession {
    scene: Scene,
    history: HistoryStack<Scene>,
    settings: EditorSettings,
    /// Set by the history-changed callback; cleared by the front end.
    menu_dirty: Arc<AtomicBool>,
    dragging: bool,
    fov_drag: Option<FovDrag>,
}

impl EditorSession {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_scene(Scene::new(), settings)
    }

    pub fn with_scene(scene: Scene, settings: EditorSettings) -> Self {
        let mut history = HistoryStack::new(settings.history_config());
        let menu_dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&menu_dirty);
        history.set_on_history_changed(move || flag.store(true, Ordering::Relaxed));

        Self {
            scene,
            history,
            settings,
            menu_dirty,
            dragging: false,
            fov_drag: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &HistoryStack<Scene> {
        &self.history
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Property edits
    // ------------------------------------------------------------------

    pub fn rename(
        &mut self,
        object: ObjectHandle,
        name: impl Into<String>,
    ) -> Result<RecordId, EditorError> {
        let name = name.into();
        let live = self.live_mut(object)?;
        let before = std::mem::replace(&mut live.name, name.clone());

        let mut record =
            ActionRecord::<Scene>::new("Rename object").with_handler(SceneEdit::Rename);
        let data = record.data_mut();
        data.resize(2);
        data.set(BEFORE, object, before);
        data.set(AFTER, object, name);
        Ok(self.commit(record))
    }

    pub fn set_transform(
        &mut self,
        object: ObjectHandle,
        transform: Transform,
    ) -> Result<RecordId, EditorError> {
        let live = self.live_mut(object)?;
        let before = std::mem::replace(&mut live.transform, transform);

        let mut record =
            ActionRecord::<Scene>::new("Transform object").with_handler(SceneEdit::SetTransform);
        let data = record.data_mut();
        data.resize(edit::TRANSFORM_LAYERS);
        data.set(edit::POSITION + BEFORE, object, before.position);
        data.set(edit::POSITION + AFTER, object, transform.position);
        data.set(edit::ROTATION + BEFORE, object, before.rotation);
        data.set(edit::ROTATION + AFTER, object, transform.rotation);
        data.set(edit::SCALE + BEFORE, object, before.scale);
        data.set(edit::SCALE + AFTER, object, transform.scale);
        Ok(self.commit(record))
    }

    /// Changes a camera's field of view.
    ///
    /// Between [`begin_drag`](Self::begin_drag) and
    /// [`end_drag`](Self::end_drag), repeated changes to the same camera
    /// replace each other so the whole drag undoes in one step.
    pub fn set_camera_fov(
        &mut self,
        camera: ObjectHandle,
        fov: f32,
    ) -> Result<RecordId, EditorError> {
        let live = self.live_mut(camera)?;
        let Some(component) = live.camera.as_mut() else {
            return Err(EditorError::MissingComponent {
                object: camera,
                component: "camera",
            });
        };
        let mut before = std::mem::replace(&mut component.fov, fov);

        if let Some(drag) = self.fov_drag.take_if(|d| d.camera == camera)
            && self.current_record() == Some(drag.record)
        {
            before = drag.origin;
            self.history.remove(drag.record, &mut self.scene);
        }

        let mut record =
            ActionRecord::<Scene>::new("Change camera FOV").with_handler(SceneEdit::SetCameraFov);
        let data = record.data_mut();
        data.resize(2);
        data.set(BEFORE, camera, before);
        data.set(AFTER, camera, fov);
        let id = self.commit(record);

        if self.dragging {
            self.fov_drag = Some(FovDrag {
                camera,
                origin: before,
                record: id,
            });
        }
        Ok(id)
    }

    pub fn set_tags(
        &mut self,
        object: ObjectHandle,
        tags: Vec<String>,
    ) -> Result<RecordId, EditorError> {
        let live = self.live_mut(object)?;
        let before = std::mem::replace(&mut live.tags, tags.clone());

        let mut record = ActionRecord::<Scene>::new("Edit tags").with_handler(SceneEdit::SetTags);
        let data = record.data_mut();
        data.resize(2);
        data.set(BEFORE, object, before);
        data.set(AFTER, object, tags);
        Ok(self.commit(record))
    }

    /// Activates or deactivates several objects as one action.
    pub fn set_active(
        &mut self,
        objects: &[ObjectHandle],
        active: bool,
    ) -> Result<RecordId, EditorError> {
        let mut objects = objects.to_vec();
        objects.sort_unstable();
        objects.dedup();
        if objects.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        for object in &objects {
            self.live_mut(*object)?;
        }

        let label = if active {
            "Activate objects"
        } else {
            "Deactivate objects"
        };
        let mut record = ActionRecord::<Scene>::new(label).with_handler(SceneEdit::SetActive);
        let data = record.data_mut();
        data.resize(2);
        for object in objects {
            let live = self.scene.get_mut(object)?;
            data.set(BEFORE, object, live.active);
            data.set(AFTER, object, active);
            live.active = active;
        }
        Ok(self.commit(record))
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Spawns `object` at the end of the root list.
    pub fn create_object(&mut self, object: GameObject) -> Result<ObjectHandle, EditorError> {
        let label = format!("Create {}", object.name);
        let handle = self.scene.spawn(object);

        let mut record = ActionRecord::<Scene>::new(label).with_handler(SceneEdit::CreateObject);
        edit::record_structure(record.data_mut(), &self.scene, &[handle]);
        self.commit(record);
        Ok(handle)
    }

    /// Removes objects from the scene. They stay alive, detached, for as long
    /// as history can bring them back.
    pub fn delete_objects(&mut self, objects: &[ObjectHandle]) -> Result<RecordId, EditorError> {
        for object in objects {
            self.live_mut(*object)?;
        }

        let mut record = ActionRecord::<Scene>::new(if objects.len() == 1 {
            "Delete object"
        } else {
            "Delete objects"
        })
        .with_handler(SceneEdit::DeleteObjects);
        let deleted = edit::record_structure(record.data_mut(), &self.scene, objects);
        if deleted.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        for object in &deleted {
            self.scene.detach(*object);
        }
        Ok(self.commit(record))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.end_drag();
        let undone = self.history.undo(&mut self.scene)?;
        self.menu_dirty.store(true, Ordering::Relaxed);
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.end_drag();
        let redone = self.history.redo(&mut self.scene)?;
        self.menu_dirty.store(true, Ordering::Relaxed);
        Ok(redone)
    }

    /// Undoes or redoes until `id` is the current record.
    pub fn jump_to(&mut self, id: RecordId) -> Result<(), EditorError> {
        self.end_drag();
        let result = self.history.jump_to(id, &mut self.scene);
        self.menu_dirty.store(true, Ordering::Relaxed);
        Ok(result?)
    }

    pub fn handle_menu(&mut self, action: MenuAction) -> Result<bool, EditorError> {
        match action {
            MenuAction::Undo => self.undo(),
            MenuAction::Redo => self.redo(),
        }
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.fov_drag = None;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.fov_drag = None;
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Replaces the scene, dropping all history. Returns the previous scene.
    pub fn load_scene(&mut self, scene: Scene) -> Scene {
        self.end_drag();
        self.history.clear(&mut self.scene);
        let previous = std::mem::replace(&mut self.scene, scene);
        self.history.mark_saved();
        self.menu_dirty.store(true, Ordering::Relaxed);
        log::info!("Loaded scene with {} object(s)", self.scene.len());
        previous
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
        self.menu_dirty.store(true, Ordering::Relaxed);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    /// Window title, with a trailing `*` while there are unsaved changes.
    pub fn title(&self) -> String {
        let marker = if self.has_unsaved_changes() { "*" } else { "" };
        format!("{}{marker}", self.settings.session.title)
    }

    pub fn edit_menu(&self) -> EditMenu {
        EditMenu::from_history(&self.history)
    }

    pub fn history_rows(&self) -> Vec<HistoryRow> {
        history_panel::history_rows(&self.history)
    }

    /// Returns `true` once after every change that affects menu labels.
    pub fn take_menu_refresh(&self) -> bool {
        self.menu_dirty.swap(false, Ordering::Relaxed)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// An attached, live object that the user can edit.
    fn live_mut(&mut self, object: ObjectHandle) -> Result<&mut GameObject, EditorError> {
        if self.history.is_object_deleted(object) || !self.scene.is_attached(object) {
            return Err(EditActionError::InvalidHandle(object).into());
        }
        Ok(self.scene.get_mut(object)?)
    }

    fn current_record(&self) -> Option<RecordId> {
        self.history
            .cursor()
            .map(|c| self.history.records()[c].id())
    }

    fn commit(&mut self, record: ActionRecord<Scene>) -> RecordId {
        let id = self.history.push(record, &mut self.scene);
        self.purge_unreachable();
        id
    }

    /// Destroys detached objects that no record can reattach any more, and
    /// flags everything destroyed so far in the history registry.
    fn purge_unreachable(&mut self) {
        for object in self.scene.detached() {
            if !self.history.references(object) {
                log::debug!("Purging {object}: no longer reachable from history");
                self.scene.destroy(object);
            }
        }
        for object in self.scene.take_destroyed() {
            self.history.mark_object_deleted(object);
        }
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("title", &self.title())
            .field("objects", &self.scene.len())
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Camera;
    use gantry_core::math::Vec3;

    fn session() -> EditorSession {
        EditorSession::new(EditorSettings::default())
    }

    #[test]
    fn rename_undo_redo() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        s.rename(a, "Player").unwrap();

        assert_eq!(s.scene().get(a).unwrap().name, "Player");
        assert!(s.undo().unwrap());
        assert_eq!(s.scene().get(a).unwrap().name, "A");
        assert!(s.redo().unwrap());
        assert_eq!(s.scene().get(a).unwrap().name, "Player");
    }

    #[test]
    fn set_transform_restores_all_parts() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        let moved = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            ..Transform::default()
        };
        s.set_transform(a, moved).unwrap();
        s.undo().unwrap();
        assert_eq!(s.scene().get(a).unwrap().transform, Transform::default());
        s.redo().unwrap();
        assert_eq!(s.scene().get(a).unwrap().transform, moved);
    }

    #[test]
    fn fov_drag_coalesces() {
        let mut s = session();
        let cam = s
            .create_object(GameObject::new("Camera").with_camera(Camera { fov: 60.0 }))
            .unwrap();
        let before = s.history().len();

        s.begin_drag();
        for fov in [61.0, 65.0, 70.0] {
            s.set_camera_fov(cam, fov).unwrap();
        }
        s.end_drag();

        assert_eq!(s.history().len(), before + 1);
        assert_eq!(s.scene().get(cam).unwrap().camera.unwrap().fov, 70.0);
        s.undo().unwrap();
        assert_eq!(s.scene().get(cam).unwrap().camera.unwrap().fov, 60.0);
    }

    #[test]
    fn fov_without_drag_records_every_change() {
        let mut s = session();
        let cam = s
            .create_object(GameObject::new("Camera").with_camera(Camera::default()))
            .unwrap();
        s.set_camera_fov(cam, 70.0).unwrap();
        s.set_camera_fov(cam, 80.0).unwrap();
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn fov_requires_camera() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        assert!(matches!(
            s.set_camera_fov(a, 10.0),
            Err(EditorError::MissingComponent { component: "camera", .. })
        ));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn set_active_is_one_step() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        let b = s.create_object(GameObject::new("B")).unwrap();
        s.set_active(&[a, b], false).unwrap();
        assert!(!s.scene().get(a).unwrap().active);

        s.undo().unwrap();
        assert!(s.scene().get(a).unwrap().active);
        assert!(s.scene().get(b).unwrap().active);
        assert!(matches!(
            s.set_active(&[], true),
            Err(EditorError::EmptySelection)
        ));
    }

    #[test]
    fn delete_then_undo_reattaches() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        let b = s.create_object(GameObject::new("B")).unwrap();
        let c = s.create_object(GameObject::new("C")).unwrap();

        s.delete_objects(&[c, a]).unwrap();
        assert_eq!(s.scene().roots(), &[b]);
        assert!(s.scene().is_alive(a));
        assert!(s.rename(a, "nope").is_err());

        s.undo().unwrap();
        assert_eq!(s.scene().roots(), &[a, b, c]);
    }

    #[test]
    fn abandoned_creation_is_destroyed_and_flagged() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        let tmp = s.create_object(GameObject::new("Temp")).unwrap();
        s.undo().unwrap();
        assert!(s.scene().is_alive(tmp));

        // A new action truncates the undone creation.
        s.rename(a, "Root").unwrap();
        assert!(!s.scene().is_alive(tmp));
        assert!(s.history().is_object_deleted(tmp));
    }

    #[test]
    fn evicted_delete_purges_objects() {
        let mut settings = EditorSettings::default();
        settings.history.max_undo = 2;
        let mut s = EditorSession::new(settings);

        let a = s.create_object(GameObject::new("A")).unwrap();
        let b = s.create_object(GameObject::new("B")).unwrap();
        s.delete_objects(&[a]).unwrap();
        assert!(s.scene().is_alive(a));

        // Pushes the delete out of the two-record window.
        s.rename(b, "B1").unwrap();
        s.rename(b, "B2").unwrap();
        assert!(!s.scene().is_alive(a));
        assert!(s.history().is_object_deleted(a));
        assert_eq!(s.scene().len(), 1);
    }

    #[test]
    fn title_tracks_save_point() {
        let mut s = session();
        assert_eq!(s.title(), "Untitled");
        let a = s.create_object(GameObject::new("A")).unwrap();
        assert_eq!(s.title(), "Untitled*");
        s.mark_saved();
        assert_eq!(s.title(), "Untitled");
        s.rename(a, "B").unwrap();
        s.undo().unwrap();
        assert_eq!(s.title(), "Untitled");
    }

    #[test]
    fn menu_refresh_fires_on_record_and_navigation() {
        let mut s = session();
        assert!(s.take_menu_refresh());
        assert!(!s.take_menu_refresh());

        let a = s.create_object(GameObject::new("A")).unwrap();
        assert!(s.take_menu_refresh());
        assert_eq!(s.edit_menu().undo.label, "Undo Create A");

        s.rename(a, "B").unwrap();
        s.take_menu_refresh();
        s.handle_menu(MenuAction::Undo).unwrap();
        assert!(s.take_menu_refresh());
        assert_eq!(s.edit_menu().redo.label, "Redo Rename object");
    }

    #[test]
    fn load_scene_clears_history() {
        let mut s = session();
        let a = s.create_object(GameObject::new("A")).unwrap();
        s.rename(a, "B").unwrap();

        let mut next = Scene::new();
        next.spawn(GameObject::new("Loaded"));
        let previous = s.load_scene(next);

        assert_eq!(previous.len(), 1);
        assert!(s.history().is_empty());
        assert!(!s.has_unsaved_changes());
        assert!(s.scene().find("Loaded").is_some());
    }
}
