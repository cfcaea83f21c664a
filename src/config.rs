use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub model_path: PathBuf,
    pub model_scale: f32,
    /// Radians added to the model's Y rotation every frame.
    pub turntable_speed: f32,
    pub frame_rate: u32,
    /// Scene node bound to the `leftDoor` role.
    pub left_door_node: String,
    /// Scene node bound to the `rightDoor` role.
    pub right_door_node: String,
    pub ground_size: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/FinalReady.gltf"),
            model_scale: 3.0,
            turntable_speed: 0.001,
            frame_rate: 60,
            // The model's door names are swapped relative to the roles.
            left_door_node: "Front_Door_Right".to_string(),
            right_door_node: "Front_Door_Left".to_string(),
            ground_size: 30.0,
        }
    }
}
