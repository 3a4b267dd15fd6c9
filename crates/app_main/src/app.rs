//! Application main loop
//! Catalog grid with the preview modal, driven by the command system

use crate::display::{WindowDisplay, WindowSlot};
use crate::engine::ProcessEngine;
use crate::video::ClockedVideoFactory;
use anyhow::Result;
use app_core::{
    AppState, CloseReason, Command, CommandId, Engine, EngineLoadRequest, LoadEvent, ModalController,
    Notification, run_engine_load,
};
use app_fs::DesktopActions;
use app_ui::{
    components::{CatalogAction, CatalogGrid, ModalAction, PreviewModal, StatusBar, StatusInfo, Toasts},
    InputHandler, Renderer, TextureCache, Theme,
};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Redraw cadence while idle; keeps progress bars and toasts moving
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Main application state for the event loop
struct App {
    state: &'static AppState,

    window: Option<Arc<Window>>,
    window_slot: WindowSlot,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    // UI Components
    grid: CatalogGrid,
    modal: PreviewModal,
    textures: TextureCache,
    input_handler: InputHandler,
    theme: Theme,

    // Preview
    controller: ModalController,
    engine: Arc<dyn Engine>,
    runtime: tokio::runtime::Runtime,
    load_tx: Sender<LoadEvent>,
    load_rx: Receiver<LoadEvent>,
}

impl App {
    fn new(state: &'static AppState, assets_root: PathBuf) -> Result<Self> {
        let config = state.config.read().clone();
        let window_slot: WindowSlot = Arc::new(Mutex::new(None));

        let controller = ModalController::new(
            Box::new(ClockedVideoFactory::new(assets_root.clone())),
            Box::new(state.notifications.clone()),
            Box::new(DesktopActions::new(assets_root.clone(), config.downloads.directory.clone())),
            Box::new(WindowDisplay::new(window_slot.clone())),
        )
        .with_viewer_config(config.viewer.clone())
        .with_engine_settings(config.engine.clone());

        let engine: Arc<dyn Engine> = Arc::new(ProcessEngine::new(
            config.engine.runtime_command.clone(),
            assets_root.clone(),
        ));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("engine-loader")
            .enable_all()
            .build()?;

        let (load_tx, load_rx) = crossbeam_channel::unbounded();

        Ok(Self {
            state,

            window: None,
            window_slot,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            egui_renderer: None,

            grid: CatalogGrid::new(config.viewer.thumbnail_size),
            modal: PreviewModal::new(),
            textures: TextureCache::new(assets_root)?,
            input_handler: InputHandler::new(config.keybindings.clone(), config.viewer.swipe_threshold_px),
            theme: Theme::by_name(&config.general.theme),

            controller,
            engine,
            runtime,
            load_tx,
            load_rx,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let start_maximized = self.state.config.read().general.start_maximized;
        let window_attrs = Window::default_attributes()
            .with_title("Folio Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800))
            .with_maximized(start_maximized);

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &renderer.device,
            renderer.config.format,
            None,
            1,
            false,
        );

        // Apply theme
        self.theme.apply(&self.egui_ctx);

        *self.window_slot.lock() = Some(window.clone());
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        Ok(())
    }

    /// Run a command against the preview; returns false when the app should exit
    fn execute_command(&mut self, cmd: &Command) -> bool {
        if cmd.is(CommandId::APP_EXIT) {
            return false;
        }

        if let Some(request) = self.controller.execute(&self.state.catalog, cmd) {
            self.spawn_load(request);
        }
        true
    }

    fn spawn_load(&self, request: EngineLoadRequest) {
        let engine = self.engine.clone();
        let sender = self.load_tx.clone();
        self.runtime.spawn(run_engine_load(engine, request, sender));
    }

    /// Feed finished asynchronous work into the controller
    fn drain_load_events(&mut self) {
        let events: Vec<LoadEvent> = self.load_rx.try_iter().collect();
        for event in events {
            self.controller.handle_load_event(event);
        }
    }

    fn open_from_grid(&mut self, category: app_core::Category, index: usize) {
        let items = self.state.catalog.items_by_category(category).to_vec();
        // Failures are already reported as notifications
        let _ = self.controller.open_at(category, items, index);
    }

    fn toggle_theme(&mut self) {
        let name = self.state.toggle_theme();
        self.theme = Theme::by_name(&name);
        self.theme.apply(&self.egui_ctx);
        if let Err(e) = self.state.save_config() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    fn render(&mut self) -> bool {
        let window = match &self.window {
            Some(w) => w.clone(),
            None => return true,
        };

        self.drain_load_events();
        self.textures.poll(&self.egui_ctx);
        self.state.notifications.lock().prune(Instant::now());
        self.input_handler.set_modal_open(self.controller.is_open());

        let raw_input = match &mut self.egui_state {
            Some(s) => s.take_egui_input(&window),
            None => return true,
        };

        // Snapshot everything the UI closure reads
        let surface = self.controller.surface();
        let fullscreen = self.controller.session().map(|s| s.fullscreen).unwrap_or(false);
        let status = StatusInfo::from_controller(self.grid.category.label(), &self.controller);
        let (toasts, toast_ttl): (Vec<Notification>, Duration) = {
            let center = self.state.notifications.lock();
            (center.visible().to_vec(), center.duration())
        };

        let catalog = self.state.catalog.clone();
        let grid = &mut self.grid;
        let modal = &mut self.modal;
        let textures = &mut self.textures;
        let theme = &self.theme;

        let mut grid_action = None;
        let mut modal_actions = Vec::new();
        let mut dismissed = None;
        let mut theme_clicked = false;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Portfolio");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let icon = if theme.name == "dark" { "☀" } else { "🌙" };
                        if ui.button(icon).on_hover_text("Toggle theme").clicked() {
                            theme_clicked = true;
                        }
                    });
                });
            });

            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                StatusBar::ui(ui, &status);
            });

            egui::CentralPanel::default().show(ctx, |ui| {
                grid_action = grid.ui(ui, &catalog, textures, theme, surface.is_none());
            });

            if let Some(surface) = &surface {
                modal_actions = modal.show(ctx, surface, fullscreen, textures, theme);
            }

            dismissed = Toasts::show(ctx, &toasts, toast_ttl, theme);
        });

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        if let (Some(renderer), Some(egui_renderer)) = (&mut self.renderer, &mut self.egui_renderer) {
            let screen = renderer.screen_descriptor(full_output.pixels_per_point);
            let clear = wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            };
            match renderer.render_egui(egui_renderer, &primitives, &full_output.textures_delta, &screen, clear) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = renderer.size;
                    renderer.resize(size);
                }
                Err(e) => tracing::error!("Surface error: {:?}", e),
            }
        }

        // Handle UI actions after the frame
        if theme_clicked {
            self.toggle_theme();
        }
        if let Some(id) = dismissed {
            self.state.notifications.lock().dismiss(id);
        }
        match grid_action {
            Some(CatalogAction::Open { category, index }) => self.open_from_grid(category, index),
            Some(CatalogAction::SelectCategory(category)) => {
                tracing::debug!(%category, "Category selected");
            }
            None => {}
        }
        for action in modal_actions {
            match action {
                ModalAction::Close(reason) => self.controller.close(reason),
                ModalAction::Command(cmd) => {
                    if !self.execute_command(&cmd) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Gestures and extra mouse buttons are read before egui sees them,
        // since egui claims every pointer event over its panels
        let gesture = match &event {
            WindowEvent::Touch(touch) => self.input_handler.handle_touch(touch),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input_handler.handle_mouse_button(*button, *state)
            }
            _ => None,
        };
        if let Some(cmd) = gesture {
            if !self.execute_command(&cmd) {
                event_loop.exit();
                return;
            }
        }

        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                self.controller.close(CloseReason::CloseControl);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    for cmd in self.input_handler.handle_key(&event) {
                        if !self.execute_command(&cmd) {
                            tracing::info!("Exit requested");
                            self.controller.close(CloseReason::CloseControl);
                            event_loop.exit();
                            return;
                        }
                    }
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input_handler.update_modifiers(modifiers.state());
            }

            WindowEvent::RedrawRequested => {
                if !self.render() {
                    self.controller.close(CloseReason::CloseControl);
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME_INTERVAL));
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the application
pub fn run(state: &'static AppState, assets_root: PathBuf) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(state, assets_root)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
