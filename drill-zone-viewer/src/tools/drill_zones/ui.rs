use bevy::prelude::*;

use super::interactions::ParameterStepButton;
use super::parameters::{ParameterFields, ZoneParameter};
use super::selection::ZoneSelection;
use super::state::*;
use crate::engine::core::config::ViewerConfig;

/// Readout for one editor parameter.
#[derive(Component, Debug, Clone, Copy)]
pub struct ParameterValueText(pub ZoneParameter);

const TEXT_COLOUR: Color = Color::srgb(1.0, 1.0, 1.0);
const MUTED_TEXT_COLOUR: Color = Color::srgb(0.6, 0.62, 0.66);
const BUTTON_COLOUR: Color = Color::srgb(0.22, 0.24, 0.28);
const PANEL_WIDTH: f32 = 300.0;

fn button_node(width: Val, height: f32) -> Node {
    Node {
        width,
        height: Val::Px(height),
        display: Display::Flex,
        align_items: AlignItems::Center,
        justify_content: JustifyContent::Center,
        border: UiRect::all(Val::Px(1.0)),
        ..default()
    }
}

fn spawn_button(parent: &mut ChildSpawnerCommands, marker: impl Bundle, label: &str, colour: Color, node: Node, font_size: f32) {
    parent
        .spawn((marker, Button, BackgroundColor(colour), BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)), node))
        .with_children(|btn| {
            btn.spawn((Text::new(label), TextFont { font_size, ..default() }, TextColor(TEXT_COLOUR)));
        });
}

// Spawns the drill zone panel: header, zone list, parameter steppers, clear and submit
pub fn spawn_zone_panel(mut commands: Commands, config: Res<ViewerConfig>) {
    commands
        .spawn((
            ZonePanelRoot,
            Name::new("DrillZonePanel"),
            Interaction::default(),
            BackgroundColor(Color::srgb(0.10, 0.11, 0.13)),
            Node {
                width: Val::Px(PANEL_WIDTH),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                right: Val::Px(0.0),
                top: Val::Px(0.0),
                bottom: Val::Px(0.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Stretch,
                justify_content: JustifyContent::FlexStart,
                overflow: Overflow::clip(),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Name::new("Header"),
                    BackgroundColor(Color::srgb(0.14, 0.16, 0.20)),
                    Node {
                        width: Val::Percent(100.0),
                        padding: UiRect::all(Val::Px(12.0)),
                        display: Display::Flex,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                ))
                .with_children(|header| {
                    header.spawn((
                        Name::new("Title"),
                        Text::new(format!("Drill Zones: {}", config.clean_name())),
                        TextFont { font_size: 18.0, ..default() },
                        TextColor(TEXT_COLOUR),
                    ));
                });

            parent
                .spawn((
                    Name::new("Body"),
                    BackgroundColor(Color::srgb(0.12, 0.13, 0.15)),
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                        row_gap: Val::Px(8.0),
                        display: Display::Flex,
                        flex_direction: FlexDirection::Column,
                        overflow: Overflow::clip_y(),
                        ..default()
                    },
                ))
                .with_children(|body| {
                    body.spawn((
                        ZoneListContainer,
                        Name::new("ZoneList"),
                        Node { width: Val::Percent(100.0), row_gap: Val::Px(4.0), flex_direction: FlexDirection::Column, ..default() },
                    ));

                    body.spawn((Text::new("Parameters"), TextFont { font_size: 16.0, ..default() }, TextColor(MUTED_TEXT_COLOUR)));
                    for parameter in ZoneParameter::ALL {
                        spawn_parameter_row(body, parameter);
                    }

                    spawn_button(body, (ClearZonesButton, Name::new("ClearZonesButton")), "Clear All", Color::srgb(0.28, 0.10, 0.10), button_node(Val::Percent(100.0), 36.0), 16.0);
                    spawn_button(body, (SubmitZonesButton, Name::new("SubmitZonesButton")), "Submit", Color::srgb(0.10, 0.28, 0.14), button_node(Val::Percent(100.0), 36.0), 16.0);
                });
        });
}

fn spawn_parameter_row(body: &mut ChildSpawnerCommands, parameter: ZoneParameter) {
    body.spawn(Node {
        width: Val::Percent(100.0),
        display: Display::Flex,
        align_items: AlignItems::Center,
        justify_content: JustifyContent::SpaceBetween,
        column_gap: Val::Px(6.0),
        ..default()
    })
    .with_children(|row| {
        row.spawn((Text::new(parameter.label()), TextFont { font_size: 14.0, ..default() }, TextColor(TEXT_COLOUR), Node { width: Val::Px(70.0), ..default() }));
        spawn_button(row, ParameterStepButton { parameter, direction: -1.0 }, "-", BUTTON_COLOUR, button_node(Val::Px(24.0), 24.0), 14.0);
        row.spawn((ParameterValueText(parameter), Text::new("-"), TextFont { font_size: 14.0, ..default() }, TextColor(MUTED_TEXT_COLOUR), Node { width: Val::Px(80.0), ..default() }));
        spawn_button(row, ParameterStepButton { parameter, direction: 1.0 }, "+", BUTTON_COLOUR, button_node(Val::Px(24.0), 24.0), 14.0);
    });
}

fn spawn_zone_row(list: &mut ChildSpawnerCommands, index: usize, zone: ZoneId, active: bool) {
    list.spawn(Node {
        width: Val::Percent(100.0),
        display: Display::Flex,
        align_items: AlignItems::Center,
        column_gap: Val::Px(4.0),
        ..default()
    })
    .with_children(|row| {
        let colour = if active { Color::srgb(1.0, 1.0, 0.0) } else { TEXT_COLOUR };
        row.spawn((Text::new(format!("Zone {index}")), TextFont { font_size: 14.0, ..default() }, TextColor(colour), Node { flex_grow: 1.0, ..default() }));
        for (action, label) in [(RowAction::Highlight, "Highlight"), (RowAction::Focus, "Focus"), (RowAction::Delete, "Delete")] {
            spawn_button(row, ZoneRowButton { zone, action }, label, BUTTON_COLOUR, button_node(Val::Auto, 24.0), 13.0);
        }
    });
}

// Rows are rebuilt whenever the store or selection changes
pub fn rebuild_zone_list(
    store: Res<DrillZoneStore>,
    selection: Res<ZoneSelection>,
    containers: Query<Entity, With<ZoneListContainer>>,
    mut commands: Commands,
) {
    if !store.is_changed() && !selection.is_changed() { return; }
    let Ok(container) = containers.single() else { return; };

    commands.entity(container).despawn_related::<Children>();
    commands.entity(container).with_children(|list| {
        if store.is_empty() {
            list.spawn((Text::new("Click the mesh to place a zone"), TextFont { font_size: 14.0, ..default() }, TextColor(MUTED_TEXT_COLOUR)));
        }
        for (i, zone) in store.iter().enumerate() {
            spawn_zone_row(list, i + 1, zone.id, selection.is_active(zone.id));
        }
    });
}

pub fn reflect_parameter_fields(fields: Res<ParameterFields>, mut texts: Query<(&mut Text, &mut TextColor, &ParameterValueText)>) {
    if !fields.is_changed() { return; }
    for (mut text, mut colour, readout) in &mut texts {
        let (label, tint) = match fields.value(readout.0) {
            Some(value) => (readout.0.display(value), TEXT_COLOUR),
            None => ("-".to_string(), MUTED_TEXT_COLOUR),
        };
        if text.0 != label { *text = Text::new(label); }
        *colour = TextColor(tint);
    }
}
