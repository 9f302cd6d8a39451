// main.rs — event loop, pages (home / viewer / share) and HUD

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod camera;
mod facts;
mod mesh;
mod renderer;

use camera::{CameraController, ViewMode};
use facts::LocationReport;
use renderer::Renderer;

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const DEFAULT_LOCATION: &str = "Mount Everest Base Camp";
const DEFAULT_SUBTITLE: &str = "Khumjung, Nepal • 5,364m";
const DEFAULT_PANORAMA_URL: &str =
    "https://lh3.googleusercontent.com/aida-public/AB6AXuD29eqBATgjZA58oJo-ElJUrFGQqlqWlLK1PznrgRrk5btlOYZWwSURN2H1hJkq37KByin3JFOXDND1cTXVMtir1HyuS7q_ix6yiRIA6TXFqS7m28aHdqSRo_HBmXHcl1Wms5ehxSevkTu0iRpMNE3HSuwOvVCkIgzI_SLHEKR_4cyVH-fy5fIITltkbvMHjhWsJJHDmdmlOphuwgWdpUsiLZ-w-FU3mimvB8C0E7rrMQB61R-_J3UcXFGvru7zyubj6ertP5Bbjgu8";
const SHARE_LINK: &str = "https://vround.app/v/ebc360-alpha";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Home,
    Viewer,
    Share,
}

// Where a decoded panorama came from; a late default fetch must not clobber
// an image the user already opened.
enum PanoSource {
    Default,
    Custom(String),
}

struct LoadedPanorama {
    image: RgbaImage,
    source: PanoSource,
}

struct UiState {
    page: Page,
    show_controls: bool,
    fullscreen: bool,
    location_name: String,
    location_subtitle: String,
    is_custom: bool,
    is_loading: bool,
    has_panorama: bool,

    ai_loading: bool,
    ai_report: Option<LocationReport>,
    ai_failed: bool,
    show_ai_modal: bool,

    share_copied_at: Option<Instant>,

    fps: f32,
    show_fps: bool,
}

impl UiState {
    fn new() -> Self {
        Self {
            page: Page::Home,
            show_controls: false,
            fullscreen: false,
            location_name: DEFAULT_LOCATION.to_string(),
            location_subtitle: DEFAULT_SUBTITLE.to_string(),
            is_custom: false,
            is_loading: false,
            has_panorama: false,
            ai_loading: false,
            ai_report: None,
            ai_failed: false,
            show_ai_modal: false,
            share_copied_at: None,
            fps: 0.0,
            show_fps: false,
        }
    }

    fn facts_context(&self) -> String {
        if self.is_custom {
            format!("a user-uploaded 360 photo titled \"{}\"", self.location_name)
        } else {
            self.location_name.clone()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("VRound")
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut viewer = CameraController::new();
    let mut state = UiState::new();

    // interaction state
    let mut last_cursor_pos: Option<PhysicalPosition<f64>> = None;

    // FPS
    let mut last_fps_time = Instant::now();
    let mut last_tick = Instant::now();
    let mut frame_count = 0u32;

    // worker channels
    let (pano_tx, pano_rx): (Sender<LoadedPanorama>, Receiver<LoadedPanorama>) = channel();
    let (facts_tx, facts_rx): (Sender<Option<LocationReport>>, Receiver<Option<LocationReport>>) =
        channel();

    // fetch the default panorama in the background; a failed fetch just
    // leaves the placeholder sphere
    start_fetch_default(DEFAULT_PANORAMA_URL.to_string(), pano_tx.clone());

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(loaded) = pano_rx.try_recv() {
            match loaded.source {
                PanoSource::Default => {
                    if state.is_custom {
                        log::info!("default panorama arrived after a custom one, ignoring");
                    } else {
                        renderer.load_panorama(loaded.image);
                    }
                }
                PanoSource::Custom(name) => {
                    renderer.load_panorama(loaded.image);
                    state.is_custom = true;
                    state.location_name = name;
                    state.location_subtitle = "User Upload".to_string();
                    // facts for the previous location no longer apply
                    state.ai_report = None;
                    state.ai_failed = false;
                    state.is_loading = false;
                }
            }
        }

        if let Ok(report) = facts_rx.try_recv() {
            state.ai_loading = false;
            state.ai_failed = report.is_none();
            state.ai_report = report;
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // egui first; it eats clicks on the HUD
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    // a release swallowed by the UI must not leave a stale drag open
                    if matches!(
                        event,
                        WindowEvent::MouseInput {
                            state: ElementState::Released,
                            button: MouseButton::Left,
                            ..
                        }
                    ) {
                        viewer.pointer_leave();
                    }
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_panorama_file() {
                                        state.is_loading = true;
                                        state.page = Page::Viewer;
                                        start_load_image(path, pano_tx.clone());
                                    }
                                }
                                Some(VirtualKeyCode::F11) => {
                                    state.fullscreen = !state.fullscreen;
                                    apply_fullscreen(&window, state.fullscreen);
                                }
                                Some(VirtualKeyCode::Escape) => {
                                    if state.show_ai_modal {
                                        state.show_ai_modal = false;
                                    } else if state.page == Page::Share {
                                        state.page = Page::Viewer;
                                    }
                                }
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput { state: el, button, .. } => {
                        if button == MouseButton::Left && state.page == Page::Viewer {
                            match el {
                                ElementState::Pressed => {
                                    if let Some(pos) = last_cursor_pos {
                                        viewer.pointer_down(
                                            pos.x as f32,
                                            pos.y as f32,
                                            Instant::now(),
                                        );
                                    }
                                }
                                ElementState::Released => {
                                    if viewer.pointer_up(Instant::now()) {
                                        state.show_controls = !state.show_controls;
                                    }
                                }
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        last_cursor_pos = Some(position);
                        viewer.pointer_move(position.x as f32, position.y as f32);
                    }

                    WindowEvent::CursorLeft { .. } => {
                        last_cursor_pos = None;
                        viewer.pointer_leave();
                    }

                    WindowEvent::DroppedFile(path) => {
                        state.is_loading = true;
                        state.page = Page::Viewer;
                        start_load_image(path, pano_tx.clone());
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick).as_secs_f32();
                last_tick = now;

                frame_count += 1;
                let fps_elapsed = now.duration_since(last_fps_time).as_secs_f32();
                if fps_elapsed >= 1.0 {
                    state.fps = frame_count as f32 / fps_elapsed;
                    frame_count = 0;
                    last_fps_time = now;
                }

                viewer.tick(dt);
                renderer.update_camera(&viewer);
                state.has_panorama = renderer.has_panorama();

                let mut next_image = None;
                let mut fetch_facts = false;
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &mut state, &mut viewer, &mut next_image, &mut fetch_facts);
                });

                if let Some(path) = next_image {
                    state.is_loading = true;
                    start_load_image(path, pano_tx.clone());
                }
                if fetch_facts {
                    state.ai_loading = true;
                    state.ai_failed = false;
                    facts::spawn_fetch(state.facts_context(), facts_tx.clone());
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn apply_fullscreen(window: &winit::window::Window, on: bool) {
    if on {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn pick_panorama_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("360° images", &["jpg", "jpeg", "png", "bmp"])
        .pick_file()
}

fn start_load_image(path: PathBuf, tx: Sender<LoadedPanorama>) {
    thread::spawn(move || {
        log::info!("loading panorama from {path:?}");

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                log::error!("cannot open {path:?}: {e}");
                return;
            }
        };

        let img_result = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .and_then(|mut r| {
                r.no_limits();
                r.decode()
            });

        match img_result {
            Ok(img) => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Custom Location".to_string());
                let _ = tx.send(LoadedPanorama {
                    image: img.to_rgba8(),
                    source: PanoSource::Custom(name),
                });
            }
            Err(e) => log::error!("cannot decode {path:?}: {e}"),
        }
    });
}

fn start_fetch_default(url: String, tx: Sender<LoadedPanorama>) {
    thread::spawn(move || {
        let fetch = || -> anyhow::Result<RgbaImage> {
            let bytes = reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?
                .get(&url)
                .send()?
                .error_for_status()?
                .bytes()?;
            Ok(image::load_from_memory(&bytes)?.to_rgba8())
        };

        match fetch() {
            Ok(image) => {
                let _ = tx.send(LoadedPanorama {
                    image,
                    source: PanoSource::Default,
                });
            }
            // sphere stays blank; everything else keeps working
            Err(e) => log::warn!("default panorama unavailable: {e:#}"),
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    state: &mut UiState,
    viewer: &mut CameraController,
    next_image: &mut Option<PathBuf>,
    fetch_facts: &mut bool,
) {
    match state.page {
        Page::Home => draw_home(ctx, state, next_image),
        Page::Viewer => draw_viewer_hud(ctx, state, viewer, fetch_facts),
        Page::Share => draw_share(ctx, state),
    }

    if state.show_ai_modal {
        draw_ai_modal(ctx, state, fetch_facts);
    }
}

fn draw_home(ctx: &egui::Context, state: &mut UiState, next_image: &mut Option<PathBuf>) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.25);
                ui.label(
                    egui::RichText::new("V R O U N D")
                        .size(40.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(
                    egui::RichText::new("360° panorama experiences")
                        .color(egui::Color32::from_gray(170)),
                );
                ui.add_space(32.0);

                if ui
                    .add(egui::Button::new(
                        egui::RichText::new("  Enter viewer  ").size(18.0),
                    ))
                    .clicked()
                {
                    state.page = Page::Viewer;
                    state.show_controls = false;
                }

                ui.add_space(8.0);
                if ui.button("Open 360° photo…").clicked() {
                    if let Some(path) = pick_panorama_file() {
                        *next_image = Some(path);
                        state.page = Page::Viewer;
                    }
                }

                ui.add_space(16.0);
                ui.label(
                    egui::RichText::new("drop an equirectangular image anywhere, or press O")
                        .small()
                        .color(egui::Color32::from_gray(120)),
                );
            });
        });
}

fn draw_viewer_hud(
    ctx: &egui::Context,
    state: &mut UiState,
    viewer: &mut CameraController,
    fetch_facts: &mut bool,
) {
    // chrome stays hidden until a tap brings it up
    if !state.show_controls {
        if state.is_loading || !state.has_panorama {
            egui::TopBottomPanel::bottom("loading_hint")
                .frame(egui::Frame::none())
                .show_separator_line(false)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new("Loading panorama…").color(egui::Color32::YELLOW),
                    );
                });
        }
        return;
    }

    egui::TopBottomPanel::top("viewer_top").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("← Back").clicked() {
                state.page = Page::Home;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mode_label = match viewer.view_mode() {
                    ViewMode::Spherical => "Tiny planet",
                    ViewMode::TinyPlanet => "Spherical",
                };
                if ui.button(mode_label).clicked() {
                    viewer.toggle_view_mode();
                }
                ui.checkbox(&mut state.show_fps, "FPS");
            });
        });
    });

    egui::TopBottomPanel::bottom("viewer_bottom").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                let badge = match (viewer.view_mode(), state.is_custom) {
                    (ViewMode::TinyPlanet, _) => "TINY PLANET MODE",
                    (_, true) => "CUSTOM VIEW",
                    (_, false) => "SPHERICAL VIEW",
                };
                ui.label(
                    egui::RichText::new(badge)
                        .small()
                        .color(egui::Color32::LIGHT_BLUE),
                );
                ui.heading(&state.location_name);
                ui.label(
                    egui::RichText::new(&state.location_subtitle)
                        .color(egui::Color32::from_gray(170)),
                );
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(egui::RichText::new("  Share  ").size(16.0)))
                    .clicked()
                {
                    state.page = Page::Share;
                }
                let info = egui::Button::new(egui::RichText::new("  Info  ").size(16.0));
                if ui.add_enabled(!state.ai_loading, info).clicked() {
                    if state.ai_report.is_none() {
                        *fetch_facts = true;
                    }
                    state.show_ai_modal = true;
                }
            });
        });

        ui.horizontal(|ui| {
            if state.is_loading {
                ui.label(egui::RichText::new("Loading image…").color(egui::Color32::YELLOW));
                ui.label("|");
            }
            ui.label(format!("FOV: {:.1}°", viewer.fov()));
            ui.label("|");
            ui.label(format!("Lon: {:.1}°", viewer.lon()));
            ui.label("|");
            ui.label(format!("Lat: {:.1}°", viewer.lat()));
            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", state.fps))
                        .color(egui::Color32::GREEN),
                );
            }
        });
    });
}

fn draw_share(ctx: &egui::Context, state: &mut UiState) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.2);
                ui.heading("Share Experience");
                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(&state.location_name)
                        .size(22.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(
                    egui::RichText::new("360° Capture · updated now")
                        .small()
                        .color(egui::Color32::from_gray(150)),
                );
                ui.add_space(24.0);

                ui.label(egui::RichText::new(SHARE_LINK).monospace());
                ui.add_space(8.0);

                let copied_recently = state
                    .share_copied_at
                    .is_some_and(|t| t.elapsed().as_secs_f32() < 2.0);
                let copy_label = if copied_recently { "Copied ✓" } else { "Copy link" };
                if ui.button(copy_label).clicked() {
                    ui.ctx().output_mut(|o| o.copied_text = SHARE_LINK.to_string());
                    state.share_copied_at = Some(Instant::now());
                }

                ui.add_space(24.0);
                if ui.button("Back to viewer").clicked() {
                    state.page = Page::Viewer;
                }
            });
        });
}

fn draw_ai_modal(ctx: &egui::Context, state: &mut UiState, fetch_facts: &mut bool) {
    let mut open = state.show_ai_modal;
    egui::Window::new("Location Intelligence")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_min_width(360.0);

            if state.ai_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Analyzing…");
                });
                return;
            }

            let Some(report) = &state.ai_report else {
                if facts::api_key().is_none() {
                    ui.label("Set GEMINI_API_KEY to enable location facts.");
                } else if state.ai_failed {
                    ui.label("No data available.");
                    if ui.button("Retry").clicked() {
                        *fetch_facts = true;
                    }
                }
                return;
            };

            ui.heading(&report.info.name);
            ui.label(
                egui::RichText::new(&report.info.location).color(egui::Color32::from_gray(170)),
            );
            ui.add_space(8.0);
            ui.label(&report.info.description);
            ui.add_space(8.0);
            ui.label(format!("Elevation / Info: {}", report.info.elevation));

            if !report.info.facts.is_empty() {
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new("OBSERVATIONS")
                        .small()
                        .color(egui::Color32::LIGHT_BLUE),
                );
                for fact in &report.info.facts {
                    ui.label(format!("• {fact}"));
                }
            }

            let web_sources: Vec<_> = report
                .sources
                .iter()
                .filter_map(|c| c.web.as_ref())
                .collect();
            if !web_sources.is_empty() {
                ui.add_space(8.0);
                ui.separator();
                ui.label(
                    egui::RichText::new("CONTEXT GROUNDING")
                        .small()
                        .color(egui::Color32::from_gray(150)),
                );
                for (i, src) in web_sources.iter().enumerate() {
                    ui.hyperlink_to(format!("[{}] {}", i + 1, src.title), &src.uri);
                }
            }
        });
    state.show_ai_modal = open;
}
