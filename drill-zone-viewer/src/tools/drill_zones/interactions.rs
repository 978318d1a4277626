use bevy::prelude::*;

use super::actions::ZoneAction;
use super::parameters::{ParameterFields, ZoneParameter};
use super::selection::ZoneSelection;
use super::state::*;

/// A −/+ stepper next to a parameter readout.
#[derive(Component, Debug, Clone, Copy)]
pub struct ParameterStepButton {
    pub parameter: ZoneParameter,
    pub direction: f32,
}

// Pointer over any panel node swallows viewport clicks
pub fn track_pointer_capture(
    nodes: Query<&Interaction, With<ZonePanelRoot>>,
    buttons: Query<&Interaction, With<Button>>,
    mut capture: ResMut<PointerCapture>,
) {
    let over_ui = nodes.iter().chain(buttons.iter()).any(|i| *i != Interaction::None);
    if capture.over_ui != over_ui { capture.over_ui = over_ui; }
}

// Delete removes the active zone, Escape releases it
pub fn zone_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    selection: Res<ZoneSelection>,
    mut actions: EventWriter<ZoneAction>,
) {
    let Some(active) = selection.active() else { return; };
    if keyboard.just_pressed(KeyCode::Delete) || keyboard.just_pressed(KeyCode::Backspace) {
        actions.write(ZoneAction::Delete(active));
    } else if keyboard.just_pressed(KeyCode::Escape) {
        actions.write(ZoneAction::Deselect);
    }
}

// Highlight / Focus / Delete on a zone row
pub fn zone_row_button_interaction(
    mut q: Query<(&Interaction, &ZoneRowButton, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
    mut actions: EventWriter<ZoneAction>,
) {
    for (interaction, button, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                actions.write(match button.action {
                    RowAction::Highlight => ZoneAction::Highlight(button.zone),
                    RowAction::Focus => ZoneAction::Focus(button.zone),
                    RowAction::Delete => ZoneAction::Delete(button.zone),
                });
                *bg = BackgroundColor(Color::srgb(0.18, 0.20, 0.24));
            }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

// Steps the bound value; clamping happens in the editor
pub fn parameter_step_interaction(
    mut q: Query<(&Interaction, &ParameterStepButton, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
    fields: Res<ParameterFields>,
    mut actions: EventWriter<ZoneAction>,
) {
    for (interaction, step, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                if let Some(current) = fields.value(step.parameter) {
                    let value = current + step.direction * step.parameter.step();
                    actions.write(ZoneAction::Edit { parameter: step.parameter, value });
                }
                *bg = BackgroundColor(Color::srgb(0.18, 0.20, 0.24));
            }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

pub fn clear_zones_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<ClearZonesButton>)>,
    mut actions: EventWriter<ZoneAction>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => { actions.write(ZoneAction::ClearAll); *bg = BackgroundColor(Color::srgb(0.20, 0.12, 0.12)); }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.34, 0.14, 0.14)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.28, 0.10, 0.10)),
        }
    }
}

pub fn submit_zones_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<SubmitZonesButton>)>,
    mut actions: EventWriter<ZoneAction>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => { actions.write(ZoneAction::Submit); *bg = BackgroundColor(Color::srgb(0.10, 0.20, 0.12)); }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.14, 0.34, 0.18)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.10, 0.28, 0.14)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut_app(selection: ZoneSelection) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(selection)
            .add_event::<ZoneAction>()
            .add_systems(Update, zone_keyboard_shortcuts);
        app
    }

    fn sent(app: &App) -> Vec<ZoneAction> {
        let events = app.world().resource::<Events<ZoneAction>>();
        events.get_cursor().read(events).cloned().collect()
    }

    #[test]
    fn delete_key_targets_active_zone() {
        let mut app = shortcut_app(ZoneSelection::Active(ZoneId(3)));
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Delete);
        app.update();
        assert_eq!(sent(&app), vec![ZoneAction::Delete(ZoneId(3))]);
    }

    #[test]
    fn escape_releases_selection() {
        let mut app = shortcut_app(ZoneSelection::Active(ZoneId(0)));
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Escape);
        app.update();
        assert_eq!(sent(&app), vec![ZoneAction::Deselect]);
    }

    #[test]
    fn keys_do_nothing_when_idle() {
        let mut app = shortcut_app(ZoneSelection::Idle);
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Delete);
        app.update();
        assert!(sent(&app).is_empty());
    }

    #[test]
    fn stepper_emits_edit_from_bound_value() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<ZoneAction>()
            .insert_resource(ParameterFields::Bound {
                zone: ZoneId(0),
                shape: ZoneShape::new(1.0, 15.0).unwrap(),
                placement: ZonePlacement::default(),
            })
            .add_systems(Update, parameter_step_interaction);
        app.world_mut().spawn((
            Button,
            Interaction::Pressed,
            BackgroundColor::default(),
            ParameterStepButton { parameter: ZoneParameter::Radius, direction: -1.0 },
        ));
        app.update();

        let actions = sent(&app);
        assert_eq!(actions.len(), 1);
        let ZoneAction::Edit { parameter, value } = &actions[0] else { panic!("expected an edit"); };
        assert_eq!(*parameter, ZoneParameter::Radius);
        assert!((*value - 0.9).abs() < 1e-5);
    }
}
