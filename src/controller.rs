use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::scene_host::SceneHost;

pub const LEFT_DOOR: &str = "leftDoor";
pub const RIGHT_DOOR: &str = "rightDoor";

/// Roles a door command touches. Every one of them must be bound before the
/// controller is ready.
pub const DOOR_ROLES: [&str; 2] = [LEFT_DOOR, RIGHT_DOOR];

pub const LEFT_DOOR_OPEN_ANGLE: f32 = TAU - PI / 5.0;
pub const RIGHT_DOOR_OPEN_ANGLE: f32 = PI / 5.0;
pub const DOOR_CLOSED_ANGLE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    Open,
    Close,
}

impl DoorCommand {
    pub fn name(self) -> &'static str {
        match self {
            DoorCommand::Open => "openDoor",
            DoorCommand::Close => "closeDoor",
        }
    }

    /// Target Y rotation for each role.
    pub fn pose(self) -> [(&'static str, f32); 2] {
        match self {
            DoorCommand::Open => [
                (LEFT_DOOR, LEFT_DOOR_OPEN_ANGLE),
                (RIGHT_DOOR, RIGHT_DOOR_OPEN_ANGLE),
            ],
            DoorCommand::Close => [
                (LEFT_DOOR, DOOR_CLOSED_ANGLE),
                (RIGHT_DOOR, DOOR_CLOSED_ANGLE),
            ],
        }
    }

    pub fn resulting_state(self) -> DoorState {
        match self {
            DoorCommand::Open => DoorState::Open,
            DoorCommand::Close => DoorState::Closed,
        }
    }
}

impl FromStr for DoorCommand {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "openDoor" => Ok(DoorCommand::Open),
            "closeDoor" => Ok(DoorCommand::Close),
            other => Err(CommandError::UnrecognizedCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Ready,
}

/// Neither variant is fatal. Callers log them and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs a role that has no node yet.
    UnboundNode { role: &'static str },
    UnrecognizedCommand(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnboundNode { role } => write!(f, "no node bound to role {role}"),
            CommandError::UnrecognizedCommand(token) => {
                write!(f, "Command not recognized: {token}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Role name to node handle. Handles are ids owned by the scene host.
#[derive(Debug, Clone)]
pub struct NodeRegistry<N> {
    nodes: HashMap<String, N>,
}

impl<N: Copy> NodeRegistry<N> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    pub fn bind(&mut self, role: impl Into<String>, node: N) -> Option<N> {
        self.nodes.insert(role.into(), node)
    }

    pub fn get(&self, role: &str) -> Option<N> {
        self.nodes.get(role).copied()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.nodes.contains_key(role)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<N: Copy> Default for NodeRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies door commands to the nodes bound to `leftDoor` and `rightDoor`.
///
/// Until both roles are bound the controller is `Uninitialized` and every
/// recognized command is a no-op. Poses are set instantly, there is no
/// tweening.
pub struct DoorController<N> {
    registry: NodeRegistry<N>,
    state: Option<DoorState>,
}

impl<N: Copy + Eq + fmt::Debug> DoorController<N> {
    pub fn new() -> Self {
        Self {
            registry: NodeRegistry::new(),
            state: None,
        }
    }

    /// Binds `role` to `node`. Rebinding replaces the previous node.
    pub fn register_node(&mut self, role: impl Into<String>, node: N) {
        let role = role.into();
        let was_ready = self.phase() == Phase::Ready;

        if let Some(previous) = self.registry.bind(role.clone(), node) {
            if previous != node {
                log::debug!("Role {role} rebound from {previous:?} to {node:?}");
            }
        }

        if !was_ready && self.phase() == Phase::Ready {
            log::info!("Door controller ready");
            self.state = Some(DoorState::Closed);
        }
    }

    pub fn phase(&self) -> Phase {
        if DOOR_ROLES.iter().all(|role| self.registry.contains(role)) {
            Phase::Ready
        } else {
            Phase::Uninitialized
        }
    }

    /// `None` until the controller is ready.
    pub fn state(&self) -> Option<DoorState> {
        self.state
    }

    #[allow(dead_code)]
    pub fn node(&self, role: &str) -> Option<N> {
        self.registry.get(role)
    }

    #[allow(dead_code)]
    pub fn registry(&self) -> &NodeRegistry<N> {
        &self.registry
    }

    /// Interprets `token` and applies the matching pose to `host`.
    ///
    /// Nothing is mutated unless every role the command needs is bound.
    pub fn handle_command<H>(&mut self, host: &mut H, token: &str) -> Result<DoorState, CommandError>
    where
        H: SceneHost<NodeId = N>,
    {
        let command: DoorCommand = token.parse()?;
        self.apply(host, command)
    }

    pub fn apply<H>(&mut self, host: &mut H, command: DoorCommand) -> Result<DoorState, CommandError>
    where
        H: SceneHost<NodeId = N>,
    {
        let pose = command.pose();

        let mut targets = Vec::with_capacity(pose.len());
        for (role, radians) in pose {
            let node = self
                .registry
                .get(role)
                .ok_or(CommandError::UnboundNode { role })?;
            targets.push((node, radians));
        }

        for (node, radians) in targets {
            host.set_rotation_y(node, radians);
        }

        let state = command.resulting_state();
        log::debug!("{} applied, doors {:?}", command.name(), state);
        self.state = Some(state);

        Ok(state)
    }
}

impl<N: Copy + Eq + fmt::Debug> Default for DoorController<N> {
    fn default() -> Self {
        Self::new()
    }
}
