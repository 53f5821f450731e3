//! UI systems: keyboard controls and the HUD readout

use bevy::prelude::*;
use chrono::SecondsFormat;

use crate::catalog::CatalogState;
use crate::core::coordinates::utc_from_julian_date;
use crate::orbital::time::REAL_TIME_FORWARD_INDEX;
use crate::orbital::{BodyClass, ClockCommand, Simulation, speed_label};
use crate::ui::state::{HudText, UIState};
use crate::visualization::VisualizationConfig;

const HELP_TEXT: &str = "\
[Space] pause   [ . / , ] faster / slower   [N] now\n\
[Left / Right] step one day   [R] reload catalog\n\
[X] planets only   [O] orbits   [F1] HUD   [?] help";

/// Keyboard binding for each clock command.
pub fn clock_command_for(key: KeyCode) -> Option<ClockCommand> {
    match key {
        KeyCode::Period | KeyCode::Equal | KeyCode::NumpadAdd => Some(ClockCommand::StepFaster),
        KeyCode::Comma | KeyCode::Minus | KeyCode::NumpadSubtract => {
            Some(ClockCommand::StepSlower)
        }
        KeyCode::KeyN => Some(ClockCommand::JumpToNow),
        KeyCode::Space => Some(ClockCommand::TogglePause),
        KeyCode::ArrowRight => Some(ClockCommand::StepForward),
        KeyCode::ArrowLeft => Some(ClockCommand::StepBackward),
        _ => None,
    }
}

/// Route key presses to the simulation, the catalog and display toggles
pub fn keyboard_controls_system(
    input: Res<ButtonInput<KeyCode>>,
    mut sim: ResMut<Simulation>,
    mut catalog: ResMut<CatalogState>,
    mut state: ResMut<UIState>,
    mut vis: ResMut<VisualizationConfig>,
) {
    for &key in input.get_just_pressed() {
        if let Some(command) = clock_command_for(key) {
            sim.apply(command);
            continue;
        }
        match key {
            KeyCode::KeyR => catalog.reload_requested = true,
            KeyCode::KeyX => {
                sim.retain_bodies(|b| b.class() == BodyClass::Planet);
                info!("Showing planets only ({} bodies)", sim.bodies().len());
            }
            KeyCode::KeyO => vis.show_orbits = !vis.show_orbits,
            KeyCode::F1 => state.show_hud = !state.show_hud,
            KeyCode::Slash => state.show_help = !state.show_help,
            _ => {}
        }
    }
}

pub fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(0.85, 0.9, 0.95)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        HudText,
    ));
}

pub fn update_hud_system(
    sim: Res<Simulation>,
    catalog: Res<CatalogState>,
    state: Res<UIState>,
    mut hud: Query<(&mut Text, &mut Visibility), With<HudText>>,
) {
    for (mut text, mut visibility) in hud.iter_mut() {
        *visibility = if state.show_hud {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if !state.show_hud {
            continue;
        }
        let mut content = hud_text(&sim, &catalog);
        if state.show_help {
            content.push_str("\n\n");
            content.push_str(HELP_TEXT);
        }
        text.0 = content;
    }
}

/// Speed readout; the one-second-per-second entry reads as real time.
pub fn speed_text(sim: &Simulation) -> String {
    let clock = sim.clock();
    let speed = if clock.speed_index() == REAL_TIME_FORWARD_INDEX {
        "real time".to_string()
    } else {
        speed_label(clock.multiplier())
    };
    if clock.is_paused() {
        format!("{speed} (paused)")
    } else {
        speed
    }
}

pub fn hud_text(sim: &Simulation, catalog: &CatalogState) -> String {
    let jd = sim.clock().julian_date();
    let date = utc_from_julian_date(jd)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "out of range".to_string());

    let mut lines = vec![
        format!("{date}  JD {jd:.4}"),
        format!("Speed: {}", speed_text(sim)),
        format!("Bodies: {}", sim.bodies().len()),
    ];
    let stale = sim.stale_count();
    if stale > 0 {
        lines.push(format!("Holding position: {stale}"));
    }
    if catalog.pending > 0 {
        lines.push(format!("Loading: {} pending", catalog.pending));
    }
    if catalog.bodies_added > 0 || catalog.records_rejected > 0 {
        lines.push(format!(
            "Catalog: {} added, {} updated, {} rejected, {} stale batches",
            catalog.bodies_added,
            catalog.bodies_replaced,
            catalog.records_rejected,
            catalog.batches_discarded
        ));
    }
    if let Some(error) = &catalog.last_error {
        lines.push(format!("Last error: {error}"));
    }
    lines.join("\n")
}
