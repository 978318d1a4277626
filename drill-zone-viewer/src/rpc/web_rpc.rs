use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::engine::core::app_state::AppState;
use crate::engine::loading::progress::LoadingProgress;
use crate::tools::drill_zones::actions::ZoneAction;
use crate::tools::drill_zones::parameters::ZoneParameter;
use crate::tools::drill_zones::persistence::{DrillZoneRecord, serialize_zones};
use crate::tools::drill_zones::selection::ZoneSelection;
use crate::tools::drill_zones::{DrillZoneStore, ZoneId};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl RpcNotification {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Resource managing bidirectional RPC communication between the host page and Bevy.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification::new(method, params));
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    #[cfg(test)]
    pub(crate) fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// Notifications queued from outside the ECS schedule, such as a persistence gateway.
#[derive(Resource, Clone, Default)]
pub struct RpcOutbox(Arc<Mutex<Vec<RpcNotification>>>);

impl RpcOutbox {
    pub fn push(&self, notification: RpcNotification) -> Result<(), String> {
        self.0
            .lock()
            .map_err(|e| e.to_string())?
            .push(notification);
        Ok(())
    }

    pub fn drain(&self) -> Vec<RpcNotification> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Plugin establishing the WebRPC layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<RpcOutbox>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    publish_zone_state,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    // Thread-safe message queue filled by the JS callback.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) = window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref()) {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Ownership moves to JS so the callback outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(Arc<Mutex<Vec<String>>>);

/// Raw message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    store: Res<DrillZoneStore>,
    selection: Res<ZoneSelection>,
    state: Res<State<AppState>>,
    mut loading_progress: ResMut<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut zone_actions: EventWriter<ZoneAction>,
) {
    let phase = *state.get();
    let mut queued = Vec::new();
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &store, &selection, phase, &mut queued) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => warn!("Unparseable RPC message: {}", parse_error),
        }
    }

    // Zone actions only apply once the mesh is up; a load before then waits with the stored records
    if phase == AppState::Loading {
        for action in queued {
            if let ZoneAction::Replace(records) = action {
                info!("Mesh still loading, {} drill zones from the host will be imported once it is ready", records.len());
                loading_progress.pending_records = Some(records);
                loading_progress.record_resolved = true;
            }
        }
        return;
    }
    zone_actions.write_batch(queued);
}

/// Methods that change zones; they need a loaded mesh.
const EDIT_METHODS: [&str; 6] = [
    "select_zone",
    "focus_zone",
    "delete_zone",
    "clear_zones",
    "submit_zones",
    "set_zone_parameter",
];

/// Handle one request. Actions it implies are appended to `actions`.
fn handle_rpc_request(
    request: &RpcRequest,
    store: &DrillZoneStore,
    selection: &ZoneSelection,
    phase: AppState,
    actions: &mut Vec<ZoneAction>,
) -> Option<RpcResponse> {
    let params = &request.params;
    let result = match request.method.as_str() {
        "get_drill_zones" => Ok(zone_state(store, selection)),
        "load_drill_zones" if phase == AppState::MeshUnavailable => {
            Err(RpcError::internal("No mesh is loaded, drill zones cannot be placed"))
        }
        method if phase != AppState::Running && EDIT_METHODS.contains(&method) => {
            Err(RpcError::internal("Mesh is not ready"))
        }
        "select_zone" => zone_at(store, params).map(|id| queue(actions, ZoneAction::Highlight(id))),
        "focus_zone" => zone_at(store, params).map(|id| queue(actions, ZoneAction::Focus(id))),
        "delete_zone" => zone_at(store, params).map(|id| queue(actions, ZoneAction::Delete(id))),
        "clear_zones" => Ok(queue(actions, ZoneAction::ClearAll)),
        "submit_zones" => Ok(queue(actions, ZoneAction::Submit)),
        "set_zone_parameter" => handle_set_parameter(params, selection, actions),
        "load_drill_zones" => handle_load_zones(params, actions),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(json!({ "method": request.method })),
            })
        }
    };

    // Notifications have no ID and get no response.
    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn queue(actions: &mut Vec<ZoneAction>, action: ZoneAction) -> Value {
    actions.push(action);
    json!({ "success": true })
}

fn zone_state(store: &DrillZoneStore, selection: &ZoneSelection) -> Value {
    let active = selection.active().and_then(|id| store.display_index(id));
    json!({
        "drillZones": serialize_zones(store),
        "active": active,
    })
}

/// Zones are addressed by their 1-based position in the list.
fn zone_at(store: &DrillZoneStore, params: &Value) -> Result<ZoneId, RpcError> {
    #[derive(Deserialize)]
    struct IndexParams {
        index: usize,
    }

    let parsed = serde_json::from_value::<IndexParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'index' parameter"))?;
    store
        .id_at(parsed.index)
        .ok_or_else(|| RpcError::invalid_params(&format!("No drill zone at index {}", parsed.index)))
}

fn handle_set_parameter(
    params: &Value,
    selection: &ZoneSelection,
    actions: &mut Vec<ZoneAction>,
) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    struct ParameterParams {
        parameter: String,
        value: Value,
    }

    let parsed = serde_json::from_value::<ParameterParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'parameter' and 'value'"))?;
    let parameter = ZoneParameter::from_name(&parsed.parameter)
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;

    let value = match &parsed.value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| RpcError::invalid_params("Value out of range"))
            .and_then(|v| parameter.sanitize(v as f32).map_err(|e| RpcError::invalid_params(&e.to_string()))),
        Value::String(text) => parameter.parse(text).map_err(|e| RpcError::invalid_params(&e.to_string())),
        _ => Err(RpcError::invalid_params("Value must be a number")),
    }?;

    if selection.active().is_none() {
        return Err(RpcError::invalid_params("No drill zone is selected"));
    }

    actions.push(ZoneAction::Edit { parameter, value });
    Ok(json!({ "success": true, "parameter": parameter.name(), "value": value }))
}

fn handle_load_zones(params: &Value, actions: &mut Vec<ZoneAction>) -> Result<Value, RpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LoadParams {
        drill_zones: Vec<DrillZoneRecord>,
    }

    let parsed = serde_json::from_value::<LoadParams>(params.clone())
        .map_err(|e| RpcError::invalid_params(&format!("Expected 'drillZones': {e}")))?;

    // Reject the whole batch before anything is replaced.
    for (index, record) in parsed.drill_zones.iter().enumerate() {
        record
            .shape()
            .map_err(|e| RpcError::invalid_params(&format!("Record {index}: {e}")))?;
    }

    let count = parsed.drill_zones.len();
    actions.push(ZoneAction::Replace(parsed.drill_zones));
    Ok(json!({ "success": true, "count": count }))
}

// Pushes the zone list to the host page whenever it or the selection changes
fn publish_zone_state(
    store: Res<DrillZoneStore>,
    selection: Res<ZoneSelection>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !store.is_changed() && !selection.is_changed() { return; }
    rpc_interface.send_notification("zones_changed", zone_state(&store, &selection));
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>, outbox: Res<RpcOutbox>) {
    for notification in outbox.drain() {
        send_message_to_parent(&notification);
    }

    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No host page on native.
        let _ = message;
    }
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
