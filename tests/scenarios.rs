use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use monitor_presets::config::{PinMode, Settings};
use monitor_presets::constants::{panels, storage, widgets};
use monitor_presets::device::{
    DeviceCommand, MatrixAssignment, MatrixLayout, MatrixMode, MonitorRole, SimulatedDevice,
};
use monitor_presets::dispatch::{WidgetEvent, WidgetPhase};
use monitor_presets::persistence::{ConfigStore, JsonFileStore, MemoryStore};
use monitor_presets::triggers::StandbyState;
use monitor_presets::ui::{Feedback, PanelUpdate, RecordingSurface, UiCall};
use monitor_presets::{HostEvent, PresetController};

struct Harness {
    controller: PresetController,
    device: Arc<SimulatedDevice>,
    store: Arc<MemoryStore>,
    ui: Arc<RecordingSurface>,
    rx: UnboundedReceiver<HostEvent>,
}

impl Harness {
    fn new(device: SimulatedDevice, store: MemoryStore) -> Self {
        let device = Arc::new(device);
        let store = Arc::new(store);
        let ui = Arc::new(RecordingSurface::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let controller =
            PresetController::new(Settings::default(), device.clone(), store.clone(), ui.clone(), tx);
        Self {
            controller,
            device,
            store,
            ui,
            rx,
        }
    }

    async fn started(device: SimulatedDevice, store: MemoryStore) -> Self {
        let mut harness = Self::new(device, store);
        harness.controller.startup().await.unwrap();
        harness.device.clear_commands();
        harness.ui.take_calls();
        harness
    }

    async fn widget(&mut self, id: &str, phase: WidgetPhase, value: &str) {
        self.controller
            .handle(HostEvent::Widget(WidgetEvent::new(id, phase, value)))
            .await
            .unwrap();
    }

    async fn release(&mut self, id: &str, value: &str) {
        self.widget(id, WidgetPhase::Released, value).await;
    }

    async fn press(&mut self, id: &str, value: &str) {
        self.widget(id, WidgetPhase::Pressed, value).await;
    }

    async fn text(&mut self, feedback: Feedback, text: &str) {
        self.controller
            .handle(HostEvent::TextInputResponse {
                feedback: feedback.to_string(),
                text: text.to_string(),
                peripheral_id: None,
            })
            .await
            .unwrap();
    }

    async fn choose(&mut self, feedback: Feedback, option_id: u32) {
        self.controller
            .handle(HostEvent::PromptResponse {
                feedback: feedback.to_string(),
                option_id,
                peripheral_id: None,
            })
            .await
            .unwrap();
    }

    /// Deliver a queued long-press expiry, if any
    async fn deliver_timer(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(event) => {
                self.controller.handle(event).await.unwrap();
                true
            }
            Err(_) => false,
        }
    }

    fn names(&self) -> Vec<String> {
        self.controller
            .registry()
            .config()
            .preset
            .list
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }
}

fn preset(name: &str, first_source: u32) -> Value {
    json!({
        "Name": name,
        "MonitorRoles": [
            {"Connector": 1, "Role": "First"},
            {"Connector": 2, "Role": "Second"}
        ],
        "Routes": [
            {"Connector": 1, "Layout": "Equal", "InputOrder": [first_source, 4]},
            {"Connector": 2, "Layout": "Prominent", "InputOrder": []}
        ]
    })
}

fn stored(pin_mode: &str, default: Option<usize>, current: Option<usize>) -> MemoryStore {
    MemoryStore::new("monitor-presets").with_value(
        storage::CONFIG_KEY,
        json!({
            "PinProtection": {"Mode": pin_mode, "Pin": "000000"},
            "OutputNames": {"1": "HDMI 1", "2": "HDMI 2"},
            "Preset": {
                "Default": default,
                "Current": current,
                "List": [preset("A", 1), preset("B", 2), preset("C", 3)]
            }
        }),
    )
}

fn assign(output: u32, source: u32, mode: MatrixMode, layout: MatrixLayout) -> DeviceCommand {
    DeviceCommand::Assign(MatrixAssignment {
        output,
        source,
        mode,
        layout,
    })
}

#[tokio::test]
async fn test_save_into_empty_list() {
    let mut h = Harness::started(SimulatedDevice::new(2, 6), MemoryStore::new("monitor-presets")).await;
    let writes_before = h.store.write_count();

    h.release("dopm~Maker~PresetSave", "").await;
    assert_eq!(h.ui.last_text_input().unwrap().feedback, Feedback::SavePreset);

    h.text(Feedback::SavePreset, "Room A").await;

    assert_eq!(h.names(), vec!["Room A"]);
    let registry = h.controller.registry();
    assert_eq!(registry.current_index(), Some(0));
    assert_eq!(registry.default_index(), None);
    assert_eq!(h.store.write_count(), writes_before + 1);
    assert_eq!(h.ui.widget_value(widgets::PRESET_SELECT).as_deref(), Some("0~Room A"));
    let stored = h.store.get(storage::CONFIG_KEY).unwrap();
    assert_eq!(stored["Preset"]["List"][0]["Name"], json!("Room A"));
    assert_eq!(stored["Preset"]["Current"], json!(0));
}

#[tokio::test]
async fn test_long_name_reprompts_without_saving() {
    let mut h = Harness::started(SimulatedDevice::new(2, 6), MemoryStore::new("monitor-presets")).await;
    let writes_before = h.store.write_count();

    h.text(Feedback::SavePreset, &"N".repeat(23)).await;

    assert!(h.names().is_empty());
    assert_eq!(h.store.write_count(), writes_before);
    let retry = h.ui.last_text_input().unwrap();
    assert_eq!(retry.feedback, Feedback::SavePreset);
    assert!(retry.title.starts_with("⚠️"));
}

#[tokio::test]
async fn test_add_sources_replays_route() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), MemoryStore::new("monitor-presets")).await;

    for source in ["5", "7"] {
        h.release("dopm~Maker~Matrix:SourceSelect", source).await;
        h.release("dopm~Maker~Matrix:Add", "").await;
    }

    assert_eq!(
        h.device.commands(),
        vec![
            assign(1, 5, MatrixMode::Replace, MatrixLayout::Equal),
            assign(1, 5, MatrixMode::Replace, MatrixLayout::Equal),
            assign(1, 7, MatrixMode::Add, MatrixLayout::Equal),
        ]
    );
    assert_eq!(h.device.matrix(1), vec![5, 7]);
    assert_eq!(
        h.ui.widget_value(widgets::ROUTE_ORDER).as_deref(),
        Some("Route Order: [5, 7]")
    );
    assert_eq!(h.controller.maker().selected_input, None);

    h.release("dopm~Maker~Matrix:Reset", "").await;
    assert_eq!(h.device.matrix(1), Vec::<u32>::new());
    assert_eq!(
        h.ui.widget_value(widgets::ROUTE_ORDER).as_deref(),
        Some("Route Order: []")
    );
}

#[tokio::test]
async fn test_add_without_source_prompts() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), MemoryStore::new("monitor-presets")).await;
    h.release("dopm~Maker~Matrix:Add", "").await;

    assert_eq!(h.ui.last_prompt().unwrap().title, "Please Select a Source");
    assert!(h.device.commands().is_empty());
}

#[tokio::test]
async fn test_release_activates_preset() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.release("dop~Presets~Select", "1~B").await;

    assert_eq!(
        h.device.commands(),
        vec![
            DeviceCommand::SetRole { output: 1, role: MonitorRole::First },
            DeviceCommand::SetRole { output: 2, role: MonitorRole::Second },
            assign(1, 2, MatrixMode::Replace, MatrixLayout::Equal),
            assign(1, 4, MatrixMode::Add, MatrixLayout::Equal),
            DeviceCommand::Reset(2),
        ]
    );
    assert_eq!(h.controller.registry().current_index(), Some(1));
    assert_eq!(h.controller.registry().len(), 3);
    assert_eq!(h.ui.widget_value(widgets::PRESET_SELECT).as_deref(), Some("1~B"));
    assert_eq!(
        h.controller.routes().route(1).unwrap().input_order,
        vec![2, 4]
    );
}

#[tokio::test]
async fn test_single_button_reads_index_from_data() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;
    h.release("dop~Presets~Select:Single~2:C", "").await;
    assert_eq!(h.controller.registry().current_index(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_long_press_opens_options_and_deletes_with_pin() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", Some(2), Some(0))).await;

    h.press("dop~Presets~Select", "1~B").await;
    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert!(h.deliver_timer().await);

    let options = h.ui.last_prompt().unwrap();
    assert_eq!(options.title, "Monitor Preset Options");
    assert_eq!(
        options.feedback,
        Some(Feedback::PresetOptions { index: 1, is_default: false })
    );

    // Release after the prompt opened still fires without suppression
    h.release("dop~Presets~Select", "1~B").await;
    assert_eq!(h.controller.registry().current_index(), Some(1));

    h.choose(Feedback::PresetOptions { index: 1, is_default: false }, 3).await;
    let pin = h.ui.last_text_input().unwrap();
    assert_eq!(pin.feedback, Feedback::ConfirmDeletePin { index: 1 });
    assert!(pin.pin);

    h.text(Feedback::ConfirmDeletePin { index: 1 }, "1111").await;
    assert_eq!(h.names(), vec!["A", "B", "C"]);
    assert!(h.ui.last_text_input().unwrap().title.starts_with("⚠️"));

    h.text(Feedback::ConfirmDeletePin { index: 1 }, "000000").await;
    assert_eq!(h.names(), vec!["A", "C"]);
    assert_eq!(h.controller.registry().default_index(), Some(1));
    assert_eq!(h.controller.registry().current_index(), None);
    assert_eq!(h.ui.widget_value(widgets::PRESET_SELECT), None);
}

#[tokio::test(start_paused = true)]
async fn test_short_press_never_opens_options() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.press("dop~Presets~Select", "0~A").await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.release("dop~Presets~Select", "0~A").await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(!h.deliver_timer().await);
    assert!(h.ui.last_prompt().is_none());
    assert_eq!(h.controller.registry().current_index(), Some(0));
}

#[tokio::test]
async fn test_delete_without_pin_uses_confirmation_prompt() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Disabled", Some(0), None)).await;

    h.choose(Feedback::PresetOptions { index: 0, is_default: true }, 3).await;
    let confirm = h.ui.last_prompt().unwrap();
    assert_eq!(confirm.feedback, Some(Feedback::ConfirmDeletePrompt { index: 0 }));
    assert_eq!(confirm.options.len(), 2);

    h.choose(Feedback::ConfirmDeletePrompt { index: 0 }, 2).await;
    assert_eq!(h.names().len(), 3);

    h.choose(Feedback::ConfirmDeletePrompt { index: 0 }, 1).await;
    assert_eq!(h.names(), vec!["B", "C"]);
    assert_eq!(h.controller.registry().default_index(), None);
}

#[tokio::test]
async fn test_removal_after_default_moves_standby_target() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Disabled", Some(1), None)).await;

    h.choose(Feedback::PresetOptions { index: 2, is_default: false }, 3).await;
    h.choose(Feedback::ConfirmDeletePrompt { index: 2 }, 1).await;
    assert_eq!(h.names(), vec!["A", "B"]);
    assert_eq!(h.controller.registry().default_index(), Some(0));

    h.controller
        .handle(HostEvent::StandbyChanged(StandbyState::Off))
        .await
        .unwrap();
    assert_eq!(h.controller.registry().current_index(), Some(0));
    assert_eq!(h.device.matrix(1), vec![1, 4]);
}

#[tokio::test]
async fn test_removing_entry_after_first_default_clears_it() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Disabled", Some(0), None)).await;

    h.choose(Feedback::ConfirmDeletePrompt { index: 1 }, 1).await;
    assert_eq!(h.controller.registry().default_index(), None);

    h.controller
        .handle(HostEvent::StandbyChanged(StandbyState::Off))
        .await
        .unwrap();
    assert!(h.device.commands().is_empty());
    assert_eq!(h.controller.registry().current_index(), None);
}

#[tokio::test]
async fn test_options_toggle_default_and_rename() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.choose(Feedback::PresetOptions { index: 2, is_default: false }, 2).await;
    assert_eq!(h.controller.registry().default_index(), Some(2));
    match h.ui.last_panel(panels::PRESET_LIST) {
        Some(PanelUpdate::PresetList(view)) => assert_eq!(view.items[2].label, "C ✪"),
        other => panic!("unexpected panel update: {other:?}"),
    }

    h.choose(Feedback::PresetOptions { index: 2, is_default: true }, 2).await;
    assert_eq!(h.controller.registry().default_index(), None);

    h.choose(Feedback::PresetOptions { index: 0, is_default: false }, 1).await;
    let rename = h.ui.last_text_input().unwrap();
    assert_eq!(rename.feedback, Feedback::RenamePreset { index: 0 });
    assert_eq!(rename.input_text.as_deref(), Some("A"));

    let writes = h.store.write_count();
    h.text(Feedback::RenamePreset { index: 0 }, "A").await;
    assert_eq!(h.store.write_count(), writes);

    h.text(Feedback::RenamePreset { index: 0 }, "Lecture").await;
    assert_eq!(h.names()[0], "Lecture");
    assert_eq!(h.store.write_count(), writes + 1);
}

#[tokio::test]
async fn test_standby_wake_applies_default() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", Some(2), None)).await;

    h.controller
        .handle(HostEvent::StandbyChanged(StandbyState::Standby))
        .await
        .unwrap();
    assert!(h.device.commands().is_empty());

    h.controller
        .handle(HostEvent::StandbyChanged(StandbyState::Off))
        .await
        .unwrap();
    assert_eq!(h.device.matrix(1), vec![3, 4]);
    assert_eq!(h.controller.registry().current_index(), Some(2));
}

#[tokio::test]
async fn test_call_disconnect_waits_for_last_call() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", Some(0), None)).await;

    h.device.set_active_calls(1);
    h.controller.handle(HostEvent::CallDisconnected).await.unwrap();
    assert!(h.device.commands().is_empty());
    assert_eq!(h.controller.registry().current_index(), None);

    h.device.set_active_calls(0);
    h.controller.handle(HostEvent::CallDisconnected).await.unwrap();
    assert_eq!(h.controller.registry().current_index(), Some(0));
}

#[tokio::test]
async fn test_events_ignored_before_subscriptions_start() {
    let mut h = Harness::new(SimulatedDevice::new(2, 8), stored("Enabled", Some(0), None));
    h.controller.handle(HostEvent::CallDisconnected).await.unwrap();
    h.controller
        .handle(HostEvent::StandbyChanged(StandbyState::Off))
        .await
        .unwrap();
    assert!(h.device.commands().is_empty());
    assert!(h.ui.calls().is_empty());
}

#[tokio::test]
async fn test_restart_restores_working_routes_only() {
    let h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", Some(0), Some(1))).await;

    assert_eq!(h.store.write_count(), 0);
    assert_eq!(h.controller.routes().route(1).unwrap().input_order, vec![2, 4]);
    assert_eq!(h.controller.registry().current_index(), Some(1));
    assert!(h.controller.subscriptions().is_armed(monitor_presets::triggers::Subscription::WidgetAction));
}

#[tokio::test]
async fn test_boot_applies_default_before_current() {
    let device = SimulatedDevice::new(2, 8).with_uptime(Duration::from_secs(3 * 60));
    let mut h = Harness::new(device, stored("Enabled", Some(2), Some(0)));
    h.controller.startup().await.unwrap();

    assert_eq!(h.controller.registry().current_index(), Some(2));
    assert_eq!(h.device.matrix(1), vec![3, 4]);
    assert_eq!(h.device.role(2), Some(MonitorRole::Second));
}

#[tokio::test]
async fn test_boot_falls_back_to_current() {
    let device = SimulatedDevice::new(2, 8).with_uptime(Duration::from_secs(3 * 60));
    let mut h = Harness::new(device, stored("Enabled", None, Some(0)));
    h.controller.startup().await.unwrap();
    assert_eq!(h.device.matrix(1), vec![1, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_startup_waits_for_uptime() {
    let device = SimulatedDevice::new(2, 8).with_uptime(Duration::from_secs(30));
    let mut h = Harness::new(device, stored("Enabled", Some(1), None));

    let started = tokio::time::Instant::now();
    h.controller.startup().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(90));
    assert_eq!(h.controller.registry().current_index(), Some(1));
}

#[tokio::test]
async fn test_maker_access_requires_pin() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.controller
        .handle(HostEvent::PanelClicked {
            panel_id: panels::MAKER_VISIBLE.to_string(),
            peripheral_id: Some("navigator".to_string()),
        })
        .await
        .unwrap();
    let gate = h.ui.last_text_input().unwrap();
    assert_eq!(gate.feedback, Feedback::MakerAccessPin);
    assert_eq!(gate.peripheral_id.as_deref(), Some("navigator"));

    h.text(Feedback::MakerAccessPin, "12").await;
    assert!(h.ui.last_text_input().unwrap().title.starts_with("⚠️"));

    h.text(Feedback::MakerAccessPin, "000000").await;
    assert!(h.ui.calls().iter().any(|call| matches!(
        call,
        UiCall::OpenPanel { panel_id, .. } if panel_id == panels::MAKER_HIDDEN
    )));
    assert_eq!(h.ui.widget_value(widgets::PIN_MODE).as_deref(), Some("Enabled"));
    assert_eq!(h.controller.maker().selected_output, 1);
}

#[tokio::test]
async fn test_maker_opens_directly_without_pin() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Disabled", None, None)).await;
    h.controller
        .handle(HostEvent::PanelClicked {
            panel_id: panels::MAKER_VISIBLE.to_string(),
            peripheral_id: None,
        })
        .await
        .unwrap();
    assert!(h.ui.last_text_input().is_none());
    assert!(matches!(h.ui.calls().first(), Some(UiCall::OpenPanel { .. })));
}

#[tokio::test]
async fn test_pin_change_flow() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.release("dopm~Config~PinProtection:Edit", "").await;
    assert_eq!(h.ui.last_text_input().unwrap().feedback, Feedback::PinEditValidate);

    h.text(Feedback::PinEditValidate, "999999").await;
    let retry = h.ui.last_text_input().unwrap();
    assert_eq!(retry.feedback, Feedback::PinEditValidate);
    assert!(retry.title.starts_with("⚠️"));

    h.text(Feedback::PinEditValidate, "000000").await;
    assert_eq!(h.ui.last_text_input().unwrap().feedback, Feedback::PinEditNewPin);

    h.text(Feedback::PinEditNewPin, "12").await;
    assert_eq!(h.ui.last_text_input().unwrap().feedback, Feedback::PinEditNewPin);

    h.text(Feedback::PinEditNewPin, "2468").await;
    assert_eq!(h.ui.last_text_input().unwrap().feedback, Feedback::PinEditConfirm);

    h.text(Feedback::PinEditConfirm, "1357").await;
    assert!(h.controller.registry().pin_matches("000000"));

    h.text(Feedback::PinEditConfirm, "2468").await;
    assert!(h.controller.registry().pin_matches("2468"));
    assert_eq!(h.ui.last_prompt().unwrap().title, "New Pin Saved!");
}

#[tokio::test]
async fn test_pin_mode_toggle_persists() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;
    h.release("dopm~Config~PinProtection:Mode", "Disabled").await;

    assert_eq!(h.controller.registry().pin_mode(), PinMode::Disabled);
    assert_eq!(h.ui.widget_value(widgets::PIN_MODE).as_deref(), Some("Disabled"));
    assert_eq!(
        h.store.get(storage::CONFIG_KEY).unwrap()["PinProtection"]["Mode"],
        json!("Disabled")
    );
}

#[tokio::test]
async fn test_output_rename_rebuilds_maker() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), stored("Enabled", None, None)).await;

    h.release("dopm~Config~DisplayName:Edit~2", "").await;
    let edit = h.ui.last_text_input().unwrap();
    assert_eq!(edit.feedback, Feedback::OutputName { connector: 2 });
    assert_eq!(edit.input_text.as_deref(), Some("HDMI 2"));

    h.text(Feedback::OutputName { connector: 2 }, "MMMMMMMMMM").await;
    assert_eq!(h.controller.registry().output_name(2), Some("HDMI 2"));
    assert_eq!(
        h.ui.last_text_input().unwrap().input_text.as_deref(),
        Some("MMMMMMMMMM")
    );

    h.text(Feedback::OutputName { connector: 2 }, "Left").await;
    assert_eq!(h.controller.registry().output_name(2), Some("Left"));
    match h.ui.last_panel(panels::MAKER_HIDDEN) {
        Some(PanelUpdate::PresetMaker(view)) => {
            assert!(view.outputs.contains(&(2, "Left".to_string())));
            assert_eq!(view.inputs.len(), 8);
        }
        other => panic!("unexpected panel update: {other:?}"),
    }
}

#[tokio::test]
async fn test_role_and_monitors_cycling() {
    let mut h = Harness::started(SimulatedDevice::new(2, 8), MemoryStore::new("monitor-presets")).await;

    h.release("dopm~Maker~OutputSelect", "2").await;
    assert_eq!(h.controller.maker().selected_output, 2);

    h.release("dopm~Maker~MonitorRole", "increment").await;
    assert_eq!(h.device.role(2), Some(MonitorRole::First));
    assert_eq!(h.ui.widget_value(widgets::MONITOR_ROLE).as_deref(), Some("First"));

    h.release("dopm~Maker~MonitorRole", "decrement").await;
    h.release("dopm~Maker~MonitorRole", "decrement").await;
    assert_eq!(h.device.role(2), Some(MonitorRole::Recorder));

    h.release("dopm~Config~MonitorsConfig:Select", "increment").await;
    assert_eq!(
        h.ui.widget_value(widgets::MONITORS_SELECT).as_deref(),
        Some("Single")
    );
}

#[tokio::test]
async fn test_corrupt_file_store_regenerates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let store = Arc::new(JsonFileStore::new(&path, "monitor-presets"));
    let ui = Arc::new(RecordingSurface::new());
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut controller = PresetController::new(
        Settings::default(),
        Arc::new(SimulatedDevice::new(3, 4)),
        store.clone(),
        ui,
        tx,
    );
    controller.startup().await.unwrap();

    assert!(controller.registry().is_empty());
    let value = store.read(storage::CONFIG_KEY).await.unwrap();
    assert_eq!(value["PinProtection"]["Pin"], json!("000000"));
    assert_eq!(value["OutputNames"]["3"], json!("HDMI 3"));
}

#[tokio::test]
async fn test_malformed_list_fails_startup() {
    let store = MemoryStore::new("monitor-presets").with_value(
        storage::CONFIG_KEY,
        json!({
            "PinProtection": {"Mode": "Enabled", "Pin": "000000"},
            "Preset": {"Default": null, "Current": null, "List": {"0": {}}}
        }),
    );
    let mut h = Harness::new(SimulatedDevice::new(2, 8), store);
    assert!(matches!(
        h.controller.startup().await,
        Err(monitor_presets::Error::Malformed { .. })
    ));
}
