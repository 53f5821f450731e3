//! Sun and lighting setup

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;

use crate::visualization::config::VisualizationConfig;

/// Marker component for the sun entity
#[derive(Component)]
pub struct SunLight;

/// Spawn the Sun at the origin: an emissive sphere carrying the scene's point light
pub fn setup_sun(
    mut commands: Commands,
    vis: Res<VisualizationConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Keep night sides of bodies faintly visible
    commands.insert_resource(GlobalAmbientLight {
        brightness: 80.0,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(vis.sun_radius).mesh().uv(48, 24))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: vis.sun_color,
            emissive: vis.sun_color.to_linear() * 40.0,
            unlit: true,
            ..default()
        })),
        PointLight {
            color: vis.sun_color,
            intensity: vis.sun_intensity,
            range: 10_000.0,
            radius: vis.sun_radius,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::ZERO),
        SunLight,
    ));
}
