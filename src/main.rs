#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging; RUST_LOG controls the level
    env_logger::init();

    // File dialogs are spawned onto the tokio runtime
    pedigree_diagram::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast;

    wasm_bindgen_futures::spawn_local(async {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("the_canvas_id"))
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        match canvas {
            Some(canvas) => {
                if let Err(e) = pedigree_diagram::start_web(canvas).await {
                    log::error!("failed to start app: {e:?}");
                }
            }
            None => log::error!("canvas element `the_canvas_id` not found"),
        }
    });
}
