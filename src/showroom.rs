use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use itertools::Itertools;

use crate::config::ViewerConfig;
use crate::controller::{CommandError, DoorController, DoorState, LEFT_DOOR, RIGHT_DOOR};
use crate::scene_graph::{Object3D, ObjectId, Scene};

const MODEL_GROUP_NAME: &str = "Model";

pub struct ShowroomState {
    pub config: ViewerConfig,
    pub scene: Scene,
    pub controller: DoorController<ObjectId>,
    pub frame: u64,
    ground: ObjectId,
    model: Option<ObjectId>,
}

impl ShowroomState {
    pub fn new(config: ViewerConfig) -> Self {
        let mut scene = Scene::new();

        let ground = scene.add_object(Object3D::named("Ground"));
        scene.set_object_rotation(ground, Vec3::new(FRAC_PI_2, 0.0, 0.0));
        scene.set_object_scale(ground, config.ground_size);

        Self {
            config,
            scene,
            controller: DoorController::new(),
            frame: 0,
            ground,
            model: None,
        }
    }

    #[allow(dead_code)]
    pub fn ground(&self) -> ObjectId {
        self.ground
    }

    #[allow(dead_code)]
    pub fn model(&self) -> Option<ObjectId> {
        self.model
    }

    /// Adds the loaded model to the scene and binds the door roles.
    pub fn on_model_loaded(&mut self, document: &gltf::Document) {
        let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next())
        else {
            log::error!("Model has no scenes");
            return;
        };

        let model = match self.scene.spawn_gltf_scene(MODEL_GROUP_NAME, &gltf_scene) {
            Ok(model) => model,
            Err(e) => {
                log::error!(
                    "Model {} rejected: {:#}",
                    self.config.model_path.display(),
                    e
                );
                return;
            }
        };
        self.scene.set_object_translation(model, Vec3::ZERO);
        self.scene.set_object_scale(model, self.config.model_scale);
        self.model = Some(model);

        log::info!(
            "Loaded {} with {} nodes",
            self.config.model_path.display(),
            document.nodes().count()
        );

        let bindings = [
            (LEFT_DOOR, self.config.left_door_node.clone()),
            (RIGHT_DOOR, self.config.right_door_node.clone()),
        ];

        for (role, node_name) in bindings {
            match self.scene.find_descendant_by_name(model, &node_name) {
                Some(node) => {
                    log::info!("{role} -> {node_name} ({node:?})");
                    self.controller.register_node(role, node);
                }
                None => {
                    log::warn!(
                        "Node {node_name} for {role} not found, available: {}",
                        self.scene.object_names().filter(|n| !n.is_empty()).join(", ")
                    );
                }
            }
        }
    }

    /// Runs one command to completion. Failures are logged, never returned.
    pub fn dispatch(&mut self, token: &str) -> Option<DoorState> {
        match self.controller.handle_command(&mut self.scene, token) {
            Ok(state) => {
                log::info!("{token}: doors {state:?}");
                Some(state)
            }
            Err(e @ CommandError::UnboundNode { .. }) => {
                log::debug!("Ignoring {token} until the model is loaded: {e}");
                None
            }
            Err(e @ CommandError::UnrecognizedCommand(_)) => {
                log::warn!("{e}");
                None
            }
        }
    }

    pub fn update(&mut self) {
        self.frame += 1;

        if let Some(model) = self.model {
            self.scene
                .rotate_object_y(model, self.config.turntable_speed);
        }
    }
}
