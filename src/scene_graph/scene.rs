use std::collections::{HashMap, HashSet};

use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    /// First object with the given name, in allocation order.
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    /// Depth-first search of `root` and its descendants.
    pub fn find_descendant_by_name(&self, root: ObjectId, name: &str) -> Option<ObjectId> {
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };

            if object.name == name {
                return Some(id);
            }

            stack.extend(object.child_ids.iter().rev().copied());
        }

        None
    }

    pub fn is_descendant_of(&self, object_id: ObjectId, ancestor_id: ObjectId) -> bool {
        let mut current = Some(object_id);

        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self.objects.get(id).and_then(|object| object.parent_id);
        }

        false
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|(_, object)| object.name.as_str())
    }

    /// Spawns the node hierarchy of a glTF scene under a new group object
    /// and returns the group. Meshes are not loaded.
    ///
    /// Fails without touching the scene if a node is reachable twice, which
    /// covers cycles and nodes shared between parents.
    pub fn spawn_gltf_scene(
        &mut self,
        group_name: &str,
        scene: &gltf::Scene,
    ) -> anyhow::Result<ObjectId> {
        let nodes = flatten_gltf_hierarchy(scene)?;

        let group_id = self.add_object(Object3D::named(group_name));
        let mut spawned: HashMap<usize, ObjectId> = HashMap::with_capacity(nodes.len());

        for (node, parent_index) in nodes {
            let parent_id = match parent_index {
                Some(index) => spawned[&index],
                None => group_id,
            };

            let object_id = self.spawn_gltf_node(&node, parent_id);
            spawned.insert(node.index(), object_id);
        }

        Ok(group_id)
    }

    fn spawn_gltf_node(&mut self, node: &gltf::Node, parent_id: ObjectId) -> ObjectId {
        let mut object = Object3D::named(node.name().unwrap_or("Unnamed"));
        let (translation, rotation, scale) = node.transform().decomposed();

        object.transform.set_transform(
            translation.into(),
            Quat::from_array(rotation),
            // Transforms only carry a uniform scale, keep the largest axis
            Vec3::from(scale).max_element(),
        );

        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent_id));

        object_id
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.objects.get(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();

            if changed {
                let local_matrix = *object.transform.get_local_matrix();
                object
                    .transform
                    .set_world_matrix(parent_world_matrix * local_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(parent_id) = new_parent_id {
            if self.is_descendant_of(parent_id, child_id) {
                log::warn!("Refusing to parent {child_id:?} under its own descendant {parent_id:?}");
                return;
            }
        }

        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
                new_parent.child_ids.push(child_id);
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation_y(&mut self, object_id: ObjectId, radians: f32) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_rotation_y(radians);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn rotate_object_y(&mut self, object_id: ObjectId, radians: f32) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.rotate_y(radians);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: f32) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn early_update(&mut self) {
        for (_, object) in self.objects.iter() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

/// Node hierarchy of `scene` in parent-before-child order, each node paired
/// with its parent's index.
fn flatten_gltf_hierarchy<'a>(
    scene: &gltf::Scene<'a>,
) -> anyhow::Result<Vec<(gltf::Node<'a>, Option<usize>)>> {
    let mut visited = HashSet::new();
    let mut ordered = Vec::new();
    let mut stack: Vec<(gltf::Node<'a>, Option<usize>)> =
        scene.nodes().map(|node| (node, None)).collect();
    stack.reverse();

    while let Some((node, parent_index)) = stack.pop() {
        if !visited.insert(node.index()) {
            anyhow::bail!(
                "glTF node {} ({}) is reachable more than once",
                node.index(),
                node.name().unwrap_or("Unnamed")
            );
        }

        let index = node.index();
        let first_child = stack.len();
        stack.extend(node.children().map(|child| (child, Some(index))));
        stack[first_child..].reverse();
        ordered.push((node, parent_index));
    }

    Ok(ordered)
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAR_GLTF: &[u8] = br#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Body", "children": [1, 2, 3], "translation": [0.0, 1.0, 0.0] },
            { "name": "Front_Door_Right" },
            { "name": "Front_Door_Left", "rotation": [0.0, 0.0, 0.0, 1.0] },
            { }
        ]
    }"#;

    fn spawn_car(scene: &mut Scene) -> ObjectId {
        let gltf = gltf::Gltf::from_slice(CAR_GLTF).unwrap();
        let gltf_scene = gltf.document.scenes().next().unwrap();
        scene.spawn_gltf_scene("Car", &gltf_scene).unwrap()
    }

    #[test]
    fn test_spawn_gltf_scene_preserves_hierarchy() {
        let mut scene = Scene::new();
        let group = spawn_car(&mut scene);

        let body = scene.find_descendant_by_name(group, "Body").unwrap();
        assert_eq!(scene.get_object(body).unwrap().parent_id, Some(group));

        let names: Vec<&str> = scene
            .get_object(body)
            .unwrap()
            .children(&scene)
            .map(|child| child.name.as_str())
            .collect();
        assert_eq!(names, ["Front_Door_Right", "Front_Door_Left", "Unnamed"]);

        let door = scene.get_object_by_name("Front_Door_Left").unwrap();
        let parent = scene.get_object(door).unwrap().parent(&scene).unwrap();
        assert_eq!(parent.name, "Body");
    }

    #[test]
    fn test_lookup_missing_name() {
        let mut scene = Scene::new();
        let group = spawn_car(&mut scene);

        assert!(scene.get_object_by_name("Trunk").is_none());
        assert!(scene.find_descendant_by_name(group, "Trunk").is_none());
    }

    #[test]
    fn test_find_descendant_is_scoped_to_root() {
        let mut scene = Scene::new();
        let outside = scene.add_object(Object3D::named("Front_Door_Right"));
        let group = spawn_car(&mut scene);

        let found = scene
            .find_descendant_by_name(group, "Front_Door_Right")
            .unwrap();
        assert_ne!(found, outside);
        assert_eq!(scene.get_object_by_name("Front_Door_Right"), Some(outside));
    }

    #[test]
    fn test_world_matrix_propagates_to_children() {
        let mut scene = Scene::new();
        let group = spawn_car(&mut scene);
        let door = scene.get_object_by_name("Front_Door_Right").unwrap();

        scene.set_object_scale(group, 3.0);
        scene.late_update();

        // Body sits one unit up, scaled by the group.
        let world = *scene.get_object_transform(door).unwrap().get_world_matrix();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);

        scene.set_object_translation(group, Vec3::X);
        scene.late_update();

        let world = *scene.get_object_transform(door).unwrap().get_world_matrix();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_reparenting_moves_child_entry() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::named("A"));
        let b = scene.add_object(Object3D::named("B"));
        let c = scene.add_object(Object3D::named("C"));

        scene.set_object_parent(c, Some(a));
        scene.set_object_parent(c, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![c]);
        assert_eq!(scene.get_object(c).unwrap().parent_id, Some(b));
    }

    #[test]
    fn test_rotation_helpers() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::named("Turntable"));

        scene.rotate_object_y(id, 0.001);
        scene.rotate_object_y(id, 0.001);
        scene.set_object_rotation(id, Vec3::new(0.5, 0.0, 0.0));
        scene.rotate_object_y(id, 0.25);

        let rotation = scene.get_object_transform(id).unwrap().rotation();
        assert_eq!(rotation, Vec3::new(0.5, 0.25, 0.0));

        scene.set_object_rotation_y(id, 0.0);
        assert_eq!(scene.get_object_transform(id).unwrap().rotation().y, 0.0);
    }

    #[test]
    fn test_early_update_resets_change_flags() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::named("Ground"));
        scene.late_update();
        scene.early_update();

        assert!(!scene.get_object_transform(id).unwrap().has_changed());
        assert_eq!(scene.object_names().collect::<Vec<_>>(), ["Ground"]);
    }

    fn first_scene(json: &[u8]) -> gltf::Document {
        gltf::Gltf::from_slice(json).unwrap().document
    }

    #[test]
    fn test_cyclic_gltf_rejected_without_spawning() {
        let document = first_scene(
            br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[
                {"name":"Car","children":[1]},
                {"name":"Front_Door_Left","children":[0]}]}"#,
        );
        let mut scene = Scene::new();

        let result = scene.spawn_gltf_scene("Car", &document.scenes().next().unwrap());

        assert!(result.is_err());
        assert_eq!(scene.objects.len(), 0);
    }

    #[test]
    fn test_shared_gltf_node_rejected() {
        let document = first_scene(
            br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0, 1]}],"nodes":[
                {"name":"Left","children":[2]},
                {"name":"Right","children":[2]},
                {"name":"Hinge"}]}"#,
        );
        let mut scene = Scene::new();

        let error = scene
            .spawn_gltf_scene("Car", &document.scenes().next().unwrap())
            .unwrap_err();

        assert!(error.to_string().contains("Hinge"));
        assert_eq!(scene.objects.len(), 0);
    }

    #[test]
    fn test_non_uniform_scale_keeps_largest_axis() {
        let document = first_scene(
            br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[
                {"name":"Front_Door_Right","scale":[1.0, 2.5, 0.5]}]}"#,
        );
        let mut scene = Scene::new();
        scene
            .spawn_gltf_scene("Car", &document.scenes().next().unwrap())
            .unwrap();

        let door = scene.get_object_by_name("Front_Door_Right").unwrap();
        assert_eq!(scene.get_object_transform(door).unwrap().scale(), 2.5);
    }

    #[test]
    fn test_parenting_under_descendant_refused() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::named("A"));
        let b = scene.add_object(Object3D::named("B"));
        scene.set_object_parent(b, Some(a));

        scene.set_object_parent(a, Some(b));
        scene.set_object_parent(a, Some(a));

        assert_eq!(scene.get_object(a).unwrap().parent_id, None);
        assert_eq!(scene.get_object(a).unwrap().child_ids, vec![b]);
        assert!(scene.get_object(b).unwrap().child_ids.is_empty());
        assert_eq!(scene.find_descendant_by_name(a, "B"), Some(b));
    }

    #[test]
    fn test_get_object_mut_renames() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::named("Door"));

        scene.get_object_mut(id).unwrap().name = "Front_Door_Left".to_string();

        assert_eq!(scene.get_object_by_name("Front_Door_Left"), Some(id));
    }
}
