use super::*;
use eframe::egui;

const SCREEN: egui::Vec2 = egui::vec2(1200.0, 800.0);

fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
    egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, SCREEN)),
        events,
        ..Default::default()
    }
}

/// Run one headless frame drawing only the canvas.
fn canvas_frame(
    ctx: &egui::Context,
    app: &mut DiagramApp,
    events: Vec<egui::Event>,
) -> egui::FullOutput {
    ctx.run(raw_input(events), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    })
}

fn press(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![
        egui::Event::PointerMoved(pos),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        },
    ]
}

fn release(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![
        egui::Event::PointerMoved(pos),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        },
    ]
}

fn key(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
    egui::Event::Key {
        key,
        physical_key: None,
        pressed: true,
        repeat: false,
        modifiers,
    }
}

fn generated_app(floors: u32, splitter: bool, booster: bool) -> DiagramApp {
    let mut app = DiagramApp::default();
    app.form.floor_count = floors;
    app.form.splitter = splitter;
    app.form.booster = booster;
    app.submit_floor_form();
    app
}

fn close(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() < 0.01 && (a.1 - b.1).abs() < 0.01
}

#[test]
fn form_generation_is_undoable() {
    let mut app = generated_app(10, true, false);
    assert_eq!(app.diagram.panels.len(), 9);
    assert!(app.diagram.panels.iter().all(|p| p.has_splitter && !p.has_booster));
    assert!(app.status_message.as_deref().unwrap().contains("from floor 10"));

    app.perform_undo();
    assert!(app.diagram.is_empty());

    app.perform_redo();
    assert_eq!(app.diagram.panels.len(), 9);
}

#[test]
fn form_clamps_floor_count() {
    let app = generated_app(80, false, false);
    assert_eq!(app.form.floor_count, 50);
    assert_eq!(app.diagram.panels.len(), 49);

    let app = generated_app(0, false, false);
    assert_eq!(app.form.floor_count, 2);
    assert_eq!(app.diagram.panels.len(), 1);
}

#[test]
fn regenerating_clears_selection() {
    let mut app = generated_app(5, true, true);
    app.diagram
        .toggle_accessory_selection(PanelId(4), AccessoryKind::Booster);
    app.interaction.selected_panel = Some(PanelId(4));

    app.submit_floor_form();
    assert!(app.diagram.selected_accessory.is_none());
    assert!(app.interaction.selected_panel.is_none());
}

#[test]
fn dragging_a_panel_moves_it_and_undo_restores() {
    let mut app = generated_app(4, false, false);
    let ctx = egui::Context::default();

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(5.0, 5.0))]);

    let original = app.diagram.panel(PanelId(3)).unwrap().position;
    let (cx, cy) = app.diagram.panel(PanelId(3)).unwrap().center();
    let start = app.world_to_screen(egui::pos2(cx, cy));
    let end = start + egui::vec2(50.0, 30.0);

    canvas_frame(&ctx, &mut app, press(start));
    assert_eq!(app.interaction.dragging_panel, Some(PanelId(3)));
    assert_eq!(app.interaction.selected_panel, Some(PanelId(3)));

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(end)]);
    canvas_frame(&ctx, &mut app, release(end));

    let moved = app.diagram.panel(PanelId(3)).unwrap().position;
    assert!(close(moved, (original.0 + 50.0, original.1 + 30.0)));
    assert!(app.interaction.dragging_panel.is_none());

    // Connectors follow the new position
    let connectors = app.diagram.connectors();
    let to_three = connectors.iter().find(|c| c.to == PanelId(3)).unwrap();
    let end_point = *to_three.waypoints.last().unwrap();
    assert!(close(end_point, app.diagram.panel(PanelId(3)).unwrap().center()));

    app.perform_undo();
    assert_eq!(app.diagram.panel(PanelId(3)).unwrap().position, original);
}

#[test]
fn clicking_an_accessory_toggles_its_selection() {
    let mut app = generated_app(4, true, true);
    let ctx = egui::Context::default();
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(5.0, 5.0))]);

    let (ax, ay) = app
        .diagram
        .panel(PanelId(4))
        .unwrap()
        .accessory_anchor(AccessoryKind::Booster);
    let marker = app.world_to_screen(egui::pos2(ax, ay));

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(marker)]);
    canvas_frame(&ctx, &mut app, press(marker));
    canvas_frame(&ctx, &mut app, release(marker));
    assert_eq!(
        app.diagram.selected_accessory,
        Some(AccessorySelection {
            panel: PanelId(4),
            kind: AccessoryKind::Booster
        })
    );
    assert_eq!(app.interaction.selected_panel, Some(PanelId(4)));
    // A click without movement does not record a move
    assert!(matches!(
        app.undo_history.pop_undo(),
        Some(UndoAction::Regenerated { .. })
    ));

    canvas_frame(&ctx, &mut app, press(marker));
    canvas_frame(&ctx, &mut app, release(marker));
    assert!(app.diagram.selected_accessory.is_none());
}

#[test]
fn resize_handle_scales_panel_and_clamps() {
    let mut app = generated_app(4, false, false);
    app.interaction.selected_panel = Some(PanelId(3));
    let ctx = egui::Context::default();
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(5.0, 5.0))]);

    let corner = app
        .panel_screen_rect(app.diagram.panel(PanelId(3)).unwrap())
        .max;
    let end = corner + egui::vec2(60.0, 30.0);

    canvas_frame(&ctx, &mut app, press(corner));
    assert_eq!(app.interaction.resizing_panel, Some(PanelId(3)));

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(end)]);
    let live = app.diagram.panel(PanelId(3)).unwrap();
    assert!(close(live.scale, (1.5, 1.5)));
    assert_eq!(live.size, (120.0, 60.0));

    canvas_frame(&ctx, &mut app, release(end));
    let panel = app.diagram.panel(PanelId(3)).unwrap();
    assert!(close(panel.size, (180.0, 90.0)));
    assert_eq!(panel.scale, (1.0, 1.0));

    app.perform_undo();
    assert_eq!(app.diagram.panel(PanelId(3)).unwrap().size, (120.0, 60.0));

    // Shrinking far past the minimum clamps to 50x30
    let corner = app
        .panel_screen_rect(app.diagram.panel(PanelId(3)).unwrap())
        .max;
    let shrink = corner - egui::vec2(110.0, 55.0);
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(corner)]);
    canvas_frame(&ctx, &mut app, press(corner));
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(shrink)]);
    canvas_frame(&ctx, &mut app, release(shrink));
    assert_eq!(app.diagram.panel(PanelId(3)).unwrap().size, (50.0, 30.0));
}

#[test]
fn clicking_empty_space_clears_inspected_panel() {
    let mut app = generated_app(3, false, false);
    app.interaction.selected_panel = Some(PanelId(3));
    let ctx = egui::Context::default();
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(5.0, 5.0))]);

    let empty = app.world_to_screen(egui::pos2(700.0, 550.0));
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(empty)]);
    canvas_frame(&ctx, &mut app, press(empty));
    canvas_frame(&ctx, &mut app, release(empty));
    assert!(app.interaction.selected_panel.is_none());
}

#[test]
fn delete_key_removes_selected_accessory() {
    let mut app = generated_app(4, true, false);
    app.diagram
        .toggle_accessory_selection(PanelId(2), AccessoryKind::Splitter);

    let ctx = egui::Context::default();
    let _ = ctx.run(
        raw_input(vec![key(egui::Key::Delete, egui::Modifiers::NONE)]),
        |ctx| app.handle_delete_key(ctx),
    );
    let panel = app.diagram.panel(PanelId(2)).unwrap();
    assert!(!panel.has_splitter);
    assert!(app.diagram.selected_accessory.is_none());

    let mut undo_input = raw_input(vec![key(egui::Key::Z, egui::Modifiers::COMMAND)]);
    undo_input.modifiers = egui::Modifiers::COMMAND;
    let _ = ctx.run(undo_input, |ctx| app.handle_undo_redo_keys(ctx));
    assert!(app.diagram.panel(PanelId(2)).unwrap().has_splitter);
}

#[test]
fn removing_missing_accessory_records_nothing() {
    let mut app = generated_app(3, false, false);
    app.undo_history = super::undo::UndoHistory::new();
    app.remove_accessory_with_undo(PanelId(3), AccessoryKind::Booster);
    app.remove_accessory_with_undo(PanelId(42), AccessoryKind::Booster);
    assert!(!app.undo_history.can_undo());
}

#[test]
fn drawing_canvas_with_panels_produces_shapes() {
    let mut app = generated_app(12, true, true);
    app.diagram
        .toggle_accessory_selection(PanelId(7), AccessoryKind::Splitter);
    app.interaction.selected_panel = Some(PanelId(7));
    let ctx = egui::Context::default();
    let output = canvas_frame(&ctx, &mut app, Vec::new());
    assert!(!output.shapes.is_empty());
}

#[test]
fn tabs_render_without_panicking() {
    let mut app = generated_app(5, true, false);
    app.vision.response_text = r#"{"responses":[{"labelAnnotations":[{"description":"Cat","score":0.9}]}]}"#.to_string();
    app.parse_vision_response();
    app.vision.selected_text = Some(0);

    let ctx = egui::Context::default();
    let _ = ctx.run(raw_input(Vec::new()), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_vision_tab(ui);
        });
    });
    let _ = ctx.run(raw_input(Vec::new()), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_map_tab(ui);
        });
    });
    let _ = ctx.run(raw_input(Vec::new()), |ctx| {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| app.draw_toolbar(ui));
        egui::SidePanel::right("props").show(ctx, |ui| app.draw_properties_panel(ui));
    });
}

#[test]
fn loaded_response_is_parsed() {
    let mut app = DiagramApp::default();
    let json = r#"{"responses":[{"localizedObjectAnnotations":[{"name":"Door","score":0.8,
        "boundingPoly":{"normalizedVertices":[{"x":0.1,"y":0.1},{"x":0.5,"y":0.1},{"x":0.5,"y":0.9}]}}]}]}"#;
    app.dialog_sender
        .send(DialogResult::ResponseLoaded(json.to_string()))
        .unwrap();
    app.handle_dialog_results();

    let result = app.vision.result.as_ref().unwrap();
    assert_eq!(result.objects.len(), 1);
    assert_eq!(result.objects[0].name, "Door");
    assert!(app.vision.parse_error.is_none());
}

#[test]
fn invalid_response_keeps_previous_result() {
    let mut app = DiagramApp::default();
    app.vision.response_text = r#"{"responses":[]}"#.to_string();
    app.parse_vision_response();
    assert!(app.vision.result.is_some());

    app.vision.response_text = "{not json".to_string();
    app.parse_vision_response();
    assert!(app.vision.result.is_some());
    assert!(app.vision.parse_error.is_some());
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn loaded_image_sets_size_and_normalizes_text() {
    let mut app = DiagramApp::default();
    app.vision.response_text = r#"{"responses":[{"fullTextAnnotation":{"pages":[{"blocks":[{"paragraphs":[{"words":[
        {"symbols":[{"text":"B"},{"text":"2"}],"confidence":0.9,
         "boundingBox":{"vertices":[{"x":10,"y":5},{"x":30,"y":5},{"x":30,"y":15},{"x":10,"y":15}]}}
    ]}]}]}]}}]}"#
        .to_string();
    app.parse_vision_response();

    app.dialog_sender
        .send(DialogResult::ImageLoaded {
            name: "sign.png".to_string(),
            bytes: png_bytes(40, 20),
        })
        .unwrap();
    app.handle_dialog_results();

    assert_eq!(app.vision.image_size, (40.0, 20.0));
    let image = app.vision.image.as_ref().unwrap();
    assert_eq!(image.size, [40, 20]);
    assert_eq!(image.name, "sign.png");

    let text = &app.vision.result.as_ref().unwrap().texts[0];
    let normalized =
        crate::overlay::normalize_vertices(&text.vertices, Some(app.vision.image_size));
    assert_eq!(normalized[0], crate::overlay::Vertex { x: 0.25, y: 0.25 });
    assert_eq!(normalized[2], crate::overlay::Vertex { x: 0.75, y: 0.75 });

    let uv = app.text_zoom_uv(0).unwrap();
    assert!((uv.min.x - 0.25).abs() < 1e-5 && (uv.min.y - 0.25).abs() < 1e-5);
    assert!((uv.max.x - 0.75).abs() < 1e-5 && (uv.max.y - 0.75).abs() < 1e-5);
    assert!(app.text_zoom_uv(1).is_none());

    // Drawing the tab uploads the texture and shows the zoomed word
    app.vision.selected_text = Some(0);
    let ctx = egui::Context::default();
    let _ = ctx.run(raw_input(Vec::new()), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_vision_tab(ui);
        });
    });
    let image = app.vision.image.as_ref().unwrap();
    assert!(image.texture.is_some());
    assert!(image.pending.is_none());
}

#[test]
fn undecodable_image_keeps_previous_size() {
    let mut app = DiagramApp::default();
    let before = app.vision.image_size;
    app.dialog_sender
        .send(DialogResult::ImageLoaded {
            name: "broken.png".to_string(),
            bytes: vec![1, 2, 3, 4],
        })
        .unwrap();
    app.handle_dialog_results();

    assert!(app.vision.image.is_none());
    assert_eq!(app.vision.image_size, before);
    assert!(app
        .status_message
        .as_deref()
        .unwrap()
        .starts_with("Failed to decode image"));
}

#[test]
fn failed_dialog_sets_status() {
    let mut app = DiagramApp::default();
    app.dialog_sender
        .send(DialogResult::OperationFailed("disk full".to_string()))
        .unwrap();
    app.handle_dialog_results();
    assert_eq!(app.status_message.as_deref(), Some("disk full"));
}

#[test]
fn summary_reports_counts_and_selection() {
    let mut app = generated_app(6, false, true);
    app.diagram
        .toggle_accessory_selection(PanelId(6), AccessoryKind::Booster);
    let text = app.summary_text();
    assert!(text.contains("Panels: 5"));
    assert!(text.contains("Connectors: 4"));
    assert!(text.contains("Booster on floor 6"));
}
