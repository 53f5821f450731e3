//! Body systems: keep one entity per tracked body in step with the simulation

use crate::body::components::OrreryBody;
use crate::body::resources::{BodyEntities, BodyEntity};
use crate::config::OrreryConfig;
use crate::core::space::WorldEclipticAu;
use crate::orbital::simulation::Body;
use crate::orbital::{BodyId, Simulation};
use crate::visualization::VisualizationConfig;
use bevy::prelude::*;
use std::collections::HashMap;

/// System to spawn entities for bodies that don't have them yet. Bodies that
/// have never resolved a position wait until they do.
pub fn spawn_missing_body_entities_system(
    sim: Res<Simulation>,
    config: Res<OrreryConfig>,
    vis: Res<VisualizationConfig>,
    mut entities: ResMut<BodyEntities>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for body in sim.bodies() {
        if !needs_entity(&entities, body) {
            continue;
        }
        let color = vis.color_for(body.class());
        let radius = vis.body_radius(body.class(), body.metadata().radius_km, config.body_display_scale);
        let position = WorldEclipticAu(body.position());
        let entity = commands
            .spawn((
                Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(32, 18))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    perceptual_roughness: 0.8,
                    ..Default::default()
                })),
                OrreryBody(body.id()),
                Name::new(body.name().to_string()),
                position,
                Transform::from_translation(position.to_bevy(config.au_to_world)),
            ))
            .id();
        entities.map.insert(
            body.id(),
            BodyEntity {
                entity,
                revision: body.revision(),
            },
        );
        debug!("Spawned entity for {}", body.name());
    }
}

fn needs_entity(entities: &BodyEntities, body: &Body) -> bool {
    body.has_position() && !entities.map.contains_key(&body.id())
}

/// System to copy each body's current position onto its entity
pub fn sync_body_transforms_system(
    sim: Res<Simulation>,
    config: Res<OrreryConfig>,
    mut q: Query<(&OrreryBody, &mut WorldEclipticAu, &mut Transform)>,
) {
    let positions: HashMap<BodyId, _> = sim
        .bodies()
        .iter()
        .map(|b| (b.id(), b.position()))
        .collect();
    for (body, mut position, mut transform) in q.iter_mut() {
        if let Some(&p) = positions.get(&body.0) {
            position.0 = p;
            transform.translation = position.to_bevy(config.au_to_world);
        }
    }
}

/// System to despawn entities whose body is no longer tracked, or whose record
/// was replaced since the entity was built
pub fn despawn_untracked_body_entities_system(
    sim: Res<Simulation>,
    mut entities: ResMut<BodyEntities>,
    mut commands: Commands,
) {
    for id in untracked_ids(&entities, &sim) {
        if let Some(spawned) = entities.map.remove(&id) {
            commands.entity(spawned.entity).despawn();
        }
    }
}

fn untracked_ids(entities: &BodyEntities, sim: &Simulation) -> Vec<BodyId> {
    let live: HashMap<BodyId, u64> = sim
        .bodies()
        .iter()
        .map(|b| (b.id(), b.revision()))
        .collect();
    entities
        .map
        .iter()
        .filter(|(id, spawned)| live.get(*id) != Some(&spawned.revision))
        .map(|(id, _)| *id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinates::J2000_JD;
    use crate::orbital::RawElementRecord;
    use crate::orbital::elements::validate;
    use crate::orbital::propagation::KeplerSolver;
    use bevy::math::DVec3;

    fn spawned(entity: Entity) -> BodyEntity {
        BodyEntity {
            entity,
            revision: 0,
        }
    }

    fn earth() -> RawElementRecord {
        RawElementRecord::default()
            .with("name", "Earth")
            .with("class", "planet")
            .with("semiMajorAxis", 1.0)
            .with("eccentricity", 0.0167)
            .with("inclination", 0.0)
            .with("longitudeOfAscendingNode", 0.0)
            .with("argumentOfPeriapsis", 102.9)
    }

    #[test]
    fn test_sync_moves_entity_to_body_position() {
        let mut sim = Simulation::default();
        let id = sim.add_record(&earth()).expect("Earth validates");
        let expected = sim.body(id).expect("tracked").position();

        let mut app = App::new();
        app.insert_resource(sim)
            .insert_resource(OrreryConfig::default())
            .add_systems(Update, sync_body_transforms_system);
        let entity = app
            .world_mut()
            .spawn((OrreryBody(id), WorldEclipticAu::default(), Transform::default()))
            .id();

        app.update();

        let position = app.world().get::<WorldEclipticAu>(entity).expect("component");
        assert_eq!(position.0, expected);
        let transform = app.world().get::<Transform>(entity).expect("transform");
        let expected_world = WorldEclipticAu(expected).to_bevy(100.0);
        assert!((transform.translation - expected_world).length() < 1e-4);
        assert!(expected.length() > 0.9 && expected != DVec3::ZERO);
    }

    #[test]
    fn test_untracked_entities_are_despawned() {
        let mut sim = Simulation::default();
        let kept = sim.add_record(&earth()).expect("Earth validates");

        let mut app = App::new();
        app.insert_resource(sim)
            .init_resource::<BodyEntities>()
            .add_systems(Update, despawn_untracked_body_entities_system);
        let kept_entity = app.world_mut().spawn(OrreryBody(kept)).id();
        let gone_entity = app.world_mut().spawn(OrreryBody(BodyId(999))).id();
        {
            let mut entities = app.world_mut().resource_mut::<BodyEntities>();
            entities.map.insert(kept, spawned(kept_entity));
            entities.map.insert(BodyId(999), spawned(gone_entity));
        }

        app.update();

        assert!(app.world().get_entity(kept_entity).is_ok());
        assert!(app.world().get_entity(gone_entity).is_err());
        let entities = app.world().resource::<BodyEntities>();
        assert_eq!(entities.map.len(), 1);
        assert!(entities.map.contains_key(&kept));
    }

    #[test]
    fn test_reload_untracks_everything() {
        let mut sim = Simulation::default();
        let id = sim.add_record(&earth()).expect("Earth validates");
        let mut entities = BodyEntities::default();
        entities.map.insert(id, spawned(Entity::PLACEHOLDER));
        assert!(untracked_ids(&entities, &sim).is_empty());

        sim.reload();
        assert_eq!(untracked_ids(&entities, &sim), vec![id]);
    }

    #[test]
    fn test_replaced_record_rebuilds_entity() {
        let mut sim = Simulation::default();
        let id = sim.add_record(&earth()).expect("Earth validates");
        let mut entities = BodyEntities::default();
        entities.map.insert(id, spawned(Entity::PLACEHOLDER));

        sim.add_record(&earth().with("class", "dwarf_planet"))
            .expect("replacement validates");
        assert_eq!(untracked_ids(&entities, &sim), vec![id]);
    }

    #[test]
    fn test_unresolved_body_is_not_spawned() {
        let record = validate(&earth()).expect("Earth validates");
        let mut body = Body::new(BodyId(7), record, 64);
        let entities = BodyEntities::default();
        assert!(!needs_entity(&entities, &body));

        body.update(&KeplerSolver::default(), J2000_JD)
            .expect("Earth resolves at J2000");
        assert!(needs_entity(&entities, &body));
    }
}
