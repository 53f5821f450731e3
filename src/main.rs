// Heliocentric orrery: Keplerian propagation of planets and minor bodies

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{RenderCreation, WgpuSettings};
use bevy::window::{PresentMode, Window, WindowPlugin};

use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod body;
mod catalog;
mod config;
mod core;
mod orbital;
mod ui;
mod visualization;

// Import plugins
use body::BodyPlugin;
use catalog::CatalogPlugin;
use config::OrreryConfig;
use orbital::OrbitalPlugin;
use ui::{MainCamera, UiPlugin};
use visualization::VisualizationPlugin;

// Setup camera
pub fn setup(mut commands: Commands, config: Res<OrreryConfig>) {
    // Frame the inner system (a few AU) on startup
    let initial_distance = config.au_to_world * 6.0;

    let pan_orbit = PanOrbitCamera {
        focus: Vec3::ZERO,              // Look at the Sun
        radius: Some(initial_distance), // Initial distance from focus point
        yaw: Some(0.0),                 // Initial yaw angle
        pitch: Some(0.6),               // Look down onto the ecliptic
        force_update: true,             // Force immediate positioning
        ..default()
    };

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            // Neptune sits at ~30 AU; keep the whole system inside the far plane
            near: 0.1,
            far: config.au_to_world * 200.0,
            ..default()
        }),
        Camera {
            order: 0,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        pan_orbit,
        MainCamera,
        Tonemapping::TonyMcMapface,
        Transform::from_xyz(0.0, 0.0, initial_distance).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn main() {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Bevy Orrery".to_string(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(RenderPlugin {
                render_creation: RenderCreation::Automatic(WgpuSettings { ..default() }),
                ..default()
            }),
    );

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Loaded after DefaultPlugins so the log subscriber is installed
    app.insert_resource(OrreryConfig::load());

    app.add_plugins(PanOrbitCameraPlugin);

    // Add our custom plugins
    app.add_plugins(OrbitalPlugin);
    app.add_plugins(CatalogPlugin);
    app.add_plugins(VisualizationPlugin);
    app.add_plugins(BodyPlugin);
    app.add_plugins(UiPlugin);
    app.add_systems(Startup, setup);

    app.run();
}
