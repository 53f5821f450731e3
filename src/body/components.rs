//! Body components for the Bevy ECS system

use bevy::prelude::*;

use crate::orbital::BodyId;

/// Links an entity to the simulation body it renders
#[derive(Component, Copy, Clone, Debug)]
pub struct OrreryBody(pub BodyId);
