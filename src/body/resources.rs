//! Body resources

use bevy::prelude::*;
use std::collections::HashMap;

use crate::orbital::BodyId;

/// Entity spawned for a tracked body, and the record revision it was built from
#[derive(Clone, Copy, Debug)]
pub struct BodyEntity {
    pub entity: Entity,
    pub revision: u64,
}

/// Entity spawned for each tracked body
#[derive(Resource, Default)]
pub struct BodyEntities {
    pub map: HashMap<BodyId, BodyEntity>,
}
