use bevy::prelude::*;
use constants::render_settings::TOAST_DURATION_SECS;
use serde::Serialize;
use serde_json::json;

use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient message for the user.
#[derive(Event, Debug, Clone)]
pub struct NotificationEvent {
    pub level: NotificationLevel,
    pub message: String,
}

impl NotificationEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

/// On-screen notification, despawned when its timer runs out.
#[derive(Component)]
pub struct Toast {
    timer: Timer,
}

/// Column in the bottom-left corner that toasts are stacked in.
#[derive(Component)]
pub struct ToastStack;

pub fn spawn_toast_stack(commands: &mut Commands) {
    commands.spawn((
        ToastStack,
        Name::new("Toasts"),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            max_width: Val::Px(420.0),
            row_gap: Val::Px(6.0),
            flex_direction: FlexDirection::ColumnReverse,
            ..default()
        },
    ));
}

pub fn forward_notifications(
    mut commands: Commands,
    mut events: EventReader<NotificationEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    stacks: Query<Entity, With<ToastStack>>,
) {
    for event in events.read() {
        match event.level {
            NotificationLevel::Info => info!("{}", event.message),
            NotificationLevel::Error => error!("{}", event.message),
        }

        rpc_interface.send_notification(
            "notification",
            json!({ "level": event.level, "message": event.message }),
        );

        let Ok(stack) = stacks.single() else {
            continue;
        };
        let background = match event.level {
            NotificationLevel::Info => Color::srgba(0.12, 0.30, 0.18, 0.92),
            NotificationLevel::Error => Color::srgba(0.45, 0.10, 0.10, 0.92),
        };
        commands
            .spawn((
                Toast { timer: Timer::from_seconds(TOAST_DURATION_SECS, TimerMode::Once) },
                BackgroundColor(background),
                Node { padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)), ..default() },
                ChildOf(stack),
            ))
            .with_children(|toast| {
                toast.spawn((
                    Text::new(event.message.clone()),
                    TextFont { font_size: 14.0, ..default() },
                    TextColor(Color::WHITE),
                ));
            });
    }
}

pub fn expire_toasts(mut commands: Commands, time: Res<Time>, mut toasts: Query<(Entity, &mut Toast)>) {
    for (entity, mut toast) in &mut toasts {
        if toast.timer.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn notification_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<WebRpcInterface>()
            .add_event::<NotificationEvent>()
            .add_systems(Update, (forward_notifications, expire_toasts).chain());
        app
    }

    #[test]
    fn notifications_reach_the_host_page() {
        let mut app = notification_app();
        app.world_mut().send_event(NotificationEvent::error("Error saving drill zones: offline"));
        app.update();

        let rpc = app.world().resource::<WebRpcInterface>();
        let sent = rpc.pending_notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "notification");
        assert_eq!(sent[0].params["level"], "error");
        assert_eq!(sent[0].params["message"], "Error saving drill zones: offline");
    }

    #[test]
    fn toasts_need_a_stack() {
        let mut app = notification_app();
        app.world_mut().send_event(NotificationEvent::info("Saved 2 drill zones"));
        app.update();

        let mut toasts = app.world_mut().query::<&Toast>();
        assert_eq!(toasts.iter(app.world()).count(), 0);

        app.world_mut().run_system_once(|mut commands: Commands| spawn_toast_stack(&mut commands)).unwrap();
        app.world_mut().send_event(NotificationEvent::info("Saved 2 drill zones"));
        app.update();
        assert_eq!(toasts.iter(app.world()).count(), 1);
    }

    #[test]
    fn finished_toasts_are_removed() {
        let mut app = notification_app();
        app.world_mut().spawn(Toast { timer: Timer::from_seconds(0.0, TimerMode::Once) });
        app.update();

        let mut toasts = app.world_mut().query::<&Toast>();
        assert_eq!(toasts.iter(app.world()).count(), 0);
    }
}
