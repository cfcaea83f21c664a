use std::fmt::Debug;

use crate::scene_graph::{ObjectId, Scene};

/// What the door controller needs from a scene graph: name lookup and
/// access to each node's rotation about the vertical axis.
pub trait SceneHost {
    type NodeId: Copy + Eq + Debug;

    fn find_node(&self, name: &str) -> Option<Self::NodeId>;

    fn rotation_y(&self, node: Self::NodeId) -> Option<f32>;

    fn set_rotation_y(&mut self, node: Self::NodeId, radians: f32);
}

impl SceneHost for Scene {
    type NodeId = ObjectId;

    fn find_node(&self, name: &str) -> Option<ObjectId> {
        self.get_object_by_name(name)
    }

    fn rotation_y(&self, node: ObjectId) -> Option<f32> {
        self.get_object_transform(node)
            .map(|transform| transform.rotation().y)
    }

    fn set_rotation_y(&mut self, node: ObjectId, radians: f32) {
        self.set_object_rotation_y(node, radians);
    }
}
