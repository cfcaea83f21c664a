use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "showroom")]
#[command(about = "Turntable car viewer driven by door commands on stdin", long_about = None)]
pub struct Cli {
    /// glTF file to load
    #[arg(long = "model")]
    pub model: Option<PathBuf>,

    /// Uniform scale applied to the loaded model
    #[arg(long = "scale")]
    pub scale: Option<f32>,

    /// Turntable rotation per frame, in radians
    #[arg(long = "turntable-speed", allow_negative_numbers = true)]
    pub turntable_speed: Option<f32>,

    #[arg(long = "frame-rate", value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_rate: Option<u32>,

    /// Node bound to the leftDoor role
    #[arg(long = "left-door-node")]
    pub left_door_node: Option<String>,

    /// Node bound to the rightDoor role
    #[arg(long = "right-door-node")]
    pub right_door_node: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> ViewerConfig {
        let defaults = ViewerConfig::default();

        ViewerConfig {
            model_path: self.model.unwrap_or(defaults.model_path),
            model_scale: self.scale.unwrap_or(defaults.model_scale),
            turntable_speed: self.turntable_speed.unwrap_or(defaults.turntable_speed),
            frame_rate: self.frame_rate.unwrap_or(defaults.frame_rate),
            left_door_node: self.left_door_node.unwrap_or(defaults.left_door_node),
            right_door_node: self.right_door_node.unwrap_or(defaults.right_door_node),
            ground_size: defaults.ground_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let config = Cli::parse_from(["showroom"]).into_config();

        assert_eq!(config.model_path, PathBuf::from("models/FinalReady.gltf"));
        assert_eq!(config.model_scale, 3.0);
        assert_eq!(config.turntable_speed, 0.001);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.left_door_node, "Front_Door_Right");
        assert_eq!(config.right_door_node, "Front_Door_Left");
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Cli::parse_from([
            "showroom",
            "--model",
            "assets/coupe.gltf",
            "--turntable-speed",
            "-0.01",
            "--frame-rate",
            "30",
            "--left-door-node",
            "Door_L",
        ])
        .into_config();

        assert_eq!(config.model_path, PathBuf::from("assets/coupe.gltf"));
        assert_eq!(config.turntable_speed, -0.01);
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.left_door_node, "Door_L");
        assert_eq!(config.right_door_node, "Front_Door_Left");
    }

    #[test]
    fn test_zero_frame_rate_rejected() {
        assert!(Cli::try_parse_from(["showroom", "--frame-rate", "0"]).is_err());
    }
}
