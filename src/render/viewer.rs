//! Window host and render loop.
//!
//! Owns the two bitmap slots, the cached noise tile, and the repaint
//! schedule: repaint on mount, on resize (coalesced to the next redraw
//! opportunity, never synchronously in the resize handler), and whenever a
//! loader result lands. The scene itself is composed on CPU and presented as
//! a fullscreen textured quad.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use crossbeam_channel as xchan;
use image::RgbaImage;
use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::{ArtworkAnchorOverride, ChairAnchorOverride, ColorPair, Configuration};
use crate::dimensions::DimensionsCm;
use crate::error::Error;
use crate::scene::draw::load_monospace_font;
use crate::scene::layout::{SceneInputs, compute_layout};
use crate::scene::noise::{NOISE_TILE_SIZE, noise_tile};
use crate::scene::paint::{Scene, paint};
use crate::scene::world::{ArtworkAnchor, ChairAnchor};

use super::loader::{LoadedBitmap, LoaderMsg, Slot, spawn_loader};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    //   NDC pos         UV
    Vertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    }, // bottom-left
    Vertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    }, // bottom-right
    Vertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    }, // top-left
    Vertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    }, // top-right
];

/// Run the scene viewer until the window closes. Decoded bitmaps arrive as
/// user events so they wake the parked event loop.
pub fn run_viewer(cfg: &Configuration) -> Result<(), Error> {
    let event_loop = EventLoop::<LoadedBitmap>::with_user_event()
        .build()
        .map_err(|e| Error::Render(e.into()))?;
    let mut app = App::new(cfg);
    app.proxy = Some(event_loop.create_proxy());
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Render(e.into()))?;
    Ok(())
}

/// One owned bitmap slot with its request generation. The generation guards
/// against a stale load overwriting a newer request: last requested wins,
/// not last resolved.
#[derive(Default)]
struct BitmapSlot {
    image: Option<RgbaImage>,
    generation: u64,
}

impl BitmapSlot {
    fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn apply(&mut self, generation: u64, image: Option<RgbaImage>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale load");
            return false;
        }
        self.image = image;
        true
    }
}

struct Tex {
    view: wgpu::TextureView,
    w: u32,
    h: u32,
}

struct Gpu {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    vbuf: wgpu::Buffer,

    tex: Tex,
    sampler: wgpu::Sampler,
}

struct App {
    // scene inputs, fixed for the run except for the host-owned toggles
    dims: Option<DimensionsCm>,
    artwork_base: ArtworkAnchor,
    chair_base: ChairAnchor,
    wall_colors: Option<ColorPair>,
    floor_colors: Option<ColorPair>,
    show_chair: bool,
    debug_overlay: bool,
    artwork_src: Option<PathBuf>,
    chair_src: Option<PathBuf>,

    // render-loop owned state
    artwork_slot: BitmapSlot,
    chair_slot: BitmapSlot,
    noise: Option<RgbaImage>,
    debug_font: Option<ab_glyph::FontVec>,
    font_probed: bool,

    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,

    tx_req: xchan::Sender<LoaderMsg>,
    proxy: Option<EventLoopProxy<LoadedBitmap>>,
}

impl App {
    fn new(cfg: &Configuration) -> Self {
        Self {
            dims: cfg.dimensions_cm(),
            artwork_base: merged_artwork_anchor(&cfg.artwork_anchor),
            chair_base: merged_chair_anchor(&cfg.chair_anchor),
            wall_colors: cfg.wall_colors,
            floor_colors: cfg.floor_colors,
            show_chair: cfg.show_chair,
            debug_overlay: cfg.debug_overlay,
            artwork_src: cfg.artwork_image.clone(),
            chair_src: cfg.chair_image.clone(),

            artwork_slot: BitmapSlot::default(),
            chair_slot: BitmapSlot::default(),
            noise: None,
            debug_font: None,
            font_probed: false,

            window: None,
            gpu: None,

            // loader starts in resumed(); placeholder endpoint until then
            tx_req: xchan::unbounded::<LoaderMsg>().0,
            proxy: None,
        }
    }

    /// Route a decode result to its slot. `true` means the frame is stale and
    /// the caller should request a repaint.
    fn apply_loaded(&mut self, loaded: LoadedBitmap) -> bool {
        let slot = match loaded.slot {
            Slot::Artwork => &mut self.artwork_slot,
            Slot::Chair => &mut self.chair_slot,
        };
        slot.apply(loaded.generation, loaded.image)
    }

    fn request_load(&mut self, slot: Slot) {
        let (slot_state, src) = match slot {
            Slot::Artwork => (&mut self.artwork_slot, &self.artwork_src),
            Slot::Chair => (&mut self.chair_slot, &self.chair_src),
        };
        let Some(path) = src else { return };
        let generation = slot_state.begin_request();
        let _ = self.tx_req.send(LoaderMsg::Load {
            slot,
            generation,
            path: path.clone(),
        });
    }
}

impl ApplicationHandler<LoadedBitmap> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // ----- window -----
        let attrs = WindowAttributes::default()
            .with_title("room preview")
            .with_inner_size(LogicalSize::new(1280.0, 800.0));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        self.window = Some(window.clone());

        // ----- request-driven loader -----
        // Decode results are forwarded as user events: a channel send alone
        // would leave them queued while the event loop parks in Wait.
        let (tx_req, rx_req) = xchan::unbounded::<LoaderMsg>();
        let (tx_res, rx_res) = xchan::unbounded::<LoadedBitmap>();
        spawn_loader(rx_req, tx_res);
        if let Some(proxy) = self.proxy.clone() {
            thread::spawn(move || {
                while let Ok(loaded) = rx_res.recv() {
                    if proxy.send_event(loaded).is_err() {
                        break;
                    }
                }
            });
        }
        self.tx_req = tx_req;
        self.request_load(Slot::Artwork);
        self.request_load(Slot::Chair);

        // ----- GPU init -----
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let gpu_init = async move {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .context("no compatible GPU adapter found")?;

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::default(),
                    },
                    None,
                )
                .await?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(wgpu::TextureFormat::is_srgb)
                .unwrap_or(caps.formats[0]);
            let size = window.inner_size();
            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width.max(1),
                height: size.height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                alpha_mode: caps.alpha_modes[0],
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            };
            surface.configure(&device, &config);

            // placeholder frame texture until the first paint
            let tex = upload_texture(&device, &queue, &[0, 0, 0, 255], 1, 1);

            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            });

            let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad"),
                contents: bytemuck::cast_slice(&QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
            });

            let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("bind_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

            let bind_group = make_bind_group(&device, &bind_layout, &tex, &sampler);

            let vlayout = wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            };

            let pip_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("pipe_layout"),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("pipeline"),
                layout: Some(&pip_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[vlayout],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

            Ok::<Gpu, anyhow::Error>(Gpu {
                _instance: instance,
                surface,
                _adapter: adapter,
                device,
                queue,
                config,
                pipeline,
                bind_layout,
                bind_group,
                vbuf,
                tex,
                sampler,
            })
        };

        self.gpu = Some(pollster::block_on(gpu_init).expect("GPU init"));
        info!("window and GPU initialized");

        if let Some(win) = &self.window {
            win.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(win) = &self.window else { return };
        if win.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                match key_action(event.physical_key, event.state, event.repeat) {
                    Some(KeyAction::Exit) => event_loop.exit(),
                    Some(KeyAction::ToggleDebugOverlay) => {
                        self.debug_overlay = !self.debug_overlay;
                        win.request_redraw();
                    }
                    Some(KeyAction::ToggleChair) => {
                        self.show_chair = !self.show_chair;
                        win.request_redraw();
                    }
                    None => {}
                }
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                // Coalesce: never paint synchronously here; the next redraw
                // opportunity picks up the fresh viewport state.
                win.request_redraw();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn user_event(&mut self, _el: &ActiveEventLoop, loaded: LoadedBitmap) {
        // wakes the loop even when it was parked; stale generations drop
        if self.apply_loaded(loaded) {
            if let Some(win) = &self.window {
                win.request_redraw();
            }
        }
    }
}

impl App {
    fn redraw(&mut self) {
        // Missing window or surface: silently skip the frame.
        let Some(window) = &self.window else { return };
        let Some(gpu) = &mut self.gpu else { return };

        let size = window.inner_size();
        let (pw, ph) = (size.width.max(1), size.height.max(1));
        if gpu.config.width != pw || gpu.config.height != ph {
            gpu.config.width = pw;
            gpu.config.height = ph;
            gpu.surface.configure(&gpu.device, &gpu.config);
        }

        let dpr = window.scale_factor() as f32;
        let view_w = pw as f32 / dpr;
        let view_h = ph as f32 / dpr;

        if self.noise.is_none() {
            self.noise = Some(noise_tile(NOISE_TILE_SIZE));
        }
        if self.debug_overlay && !self.font_probed {
            self.font_probed = true;
            self.debug_font = load_monospace_font();
        }
        let Some(noise) = &self.noise else { return };

        let inputs = SceneInputs {
            dims: self.dims,
            artwork_base: self.artwork_base,
            chair_base: self.chair_base,
        };
        let layout = compute_layout(&inputs, view_w, view_h);

        let mut frame = RgbaImage::new(pw, ph);
        paint(
            &mut frame,
            &Scene {
                layout: &layout,
                wall_colors: self.wall_colors,
                floor_colors: self.floor_colors,
                artwork: self.artwork_slot.image.as_ref(),
                chair: self.chair_slot.image.as_ref(),
                noise,
                show_chair: self.show_chair,
                debug_overlay: self.debug_overlay,
                debug_font: self.debug_font.as_ref(),
                device_pixel_ratio: dpr,
            },
        );

        if gpu.tex.w != pw || gpu.tex.h != ph {
            debug!(width = pw, height = ph, "resizing frame texture");
        }
        gpu.tex = upload_texture(&gpu.device, &gpu.queue, frame.as_raw(), pw, ph);
        gpu.bind_group = make_bind_group(&gpu.device, &gpu.bind_layout, &gpu.tex, &gpu.sampler);

        let Ok(surface_frame) = gpu.surface.get_current_texture() else {
            return;
        };
        let view = surface_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&gpu.pipeline);
            rpass.set_bind_group(0, &gpu.bind_group, &[]);
            rpass.set_vertex_buffer(0, gpu.vbuf.slice(..));
            rpass.draw(0..4, 0..1);
        }
        gpu.queue.submit([encoder.finish()]);
        surface_frame.present();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Exit,
    ToggleDebugOverlay,
    ToggleChair,
}

/// Keys act on the initial press only; releases and auto-repeat are ignored.
fn key_action(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<KeyAction> {
    if state != ElementState::Pressed || repeat {
        return None;
    }
    match key {
        PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ) => Some(KeyAction::Exit),
        PhysicalKey::Code(KeyCode::KeyD) => Some(KeyAction::ToggleDebugOverlay),
        PhysicalKey::Code(KeyCode::KeyC) => Some(KeyAction::ToggleChair),
        _ => None,
    }
}

fn merged_artwork_anchor(o: &ArtworkAnchorOverride) -> ArtworkAnchor {
    let mut a = ArtworkAnchor::DEFAULT;
    if let Some(v) = o.center_x {
        a.cx = v;
    }
    if let Some(v) = o.width {
        a.w = v;
    }
    if let Some(v) = o.height {
        a.h = v;
    }
    if let Some(v) = o.bottom_gap {
        a.bottom_gap = v;
    }
    a
}

fn merged_chair_anchor(o: &ChairAnchorOverride) -> ChairAnchor {
    let mut c = ChairAnchor::DEFAULT;
    if let Some(v) = o.center_x {
        c.cx = v;
    }
    if let Some(v) = o.width {
        c.w = v;
    }
    if let Some(v) = o.height {
        c.h = v;
    }
    if let Some(v) = o.floor_offset {
        c.floor_offset = v;
    }
    c
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pixels: &[u8],
    w: u32,
    h: u32,
) -> Tex {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene frame"),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        tex.as_image_copy(),
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
    Tex {
        view: tex.create_view(&wgpu::TextureViewDescriptor::default()),
        w,
        h,
    }
}

fn make_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    tex: &Tex,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&tex.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_dropped() {
        let mut slot = BitmapSlot::default();
        let first = slot.begin_request();
        let second = slot.begin_request();
        assert!(!slot.apply(first, Some(RgbaImage::new(1, 1))));
        assert!(slot.image.is_none());
        assert!(slot.apply(second, Some(RgbaImage::new(2, 2))));
        assert_eq!(slot.image.as_ref().map(RgbaImage::dimensions), Some((2, 2)));
    }

    #[test]
    fn loaded_bitmap_routes_to_its_slot_and_flags_a_repaint() {
        let mut app = App::new(&Configuration::default());
        let art_gen = app.artwork_slot.begin_request();
        let chair_gen = app.chair_slot.begin_request();

        // a fresh result lands in its own slot and reports the frame stale
        assert!(app.apply_loaded(LoadedBitmap {
            slot: Slot::Chair,
            generation: chair_gen,
            image: Some(RgbaImage::new(3, 3)),
        }));
        assert!(app.artwork_slot.image.is_none());
        assert_eq!(
            app.chair_slot.image.as_ref().map(RgbaImage::dimensions),
            Some((3, 3))
        );

        // a superseded artwork result is dropped and requests no repaint
        let _newer = app.artwork_slot.begin_request();
        assert!(!app.apply_loaded(LoadedBitmap {
            slot: Slot::Artwork,
            generation: art_gen,
            image: Some(RgbaImage::new(1, 1)),
        }));
        assert!(app.artwork_slot.image.is_none());
    }

    #[test]
    fn keys_act_on_initial_press_only() {
        let d = PhysicalKey::Code(KeyCode::KeyD);
        assert_eq!(
            key_action(d, ElementState::Pressed, false),
            Some(KeyAction::ToggleDebugOverlay)
        );
        assert_eq!(key_action(d, ElementState::Released, false), None);
        assert_eq!(key_action(d, ElementState::Pressed, true), None);

        for quit in [KeyCode::Escape, KeyCode::KeyQ] {
            assert_eq!(
                key_action(PhysicalKey::Code(quit), ElementState::Pressed, false),
                Some(KeyAction::Exit)
            );
        }
        assert_eq!(
            key_action(PhysicalKey::Code(KeyCode::KeyC), ElementState::Pressed, false),
            Some(KeyAction::ToggleChair)
        );
        assert_eq!(
            key_action(PhysicalKey::Code(KeyCode::KeyX), ElementState::Pressed, false),
            None
        );
    }

    #[test]
    fn anchor_overrides_merge_over_defaults() {
        let a = merged_artwork_anchor(&ArtworkAnchorOverride {
            width: Some(500.0),
            ..Default::default()
        });
        assert_eq!(a.w, 500.0);
        assert_eq!(a.cx, ArtworkAnchor::DEFAULT.cx);

        let c = merged_chair_anchor(&ChairAnchorOverride {
            floor_offset: Some(140.0),
            ..Default::default()
        });
        assert_eq!(c.floor_offset, 140.0);
        assert_eq!(c.w, ChairAnchor::DEFAULT.w);
    }
}
