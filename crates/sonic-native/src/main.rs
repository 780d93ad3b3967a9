use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use glam::Vec2;
use sonic_core::render::{Raster, Surface};
use sonic_core::{
    AudioSession, Catalog, DepthReadout, FrameInput, SonicConfig, SonicField, Viewport,
};

mod synth;

use synth::CpalBackend;

/// The field renders on the CPU at a fraction of the window size and the
/// GPU upscales it.
const RENDER_SCALE: f32 = 0.5;
const BLIT_WGSL: &str = include_str!("../shaders/blit.wgsl");

fn render_size(window: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (
        ((window.width as f32 * RENDER_SCALE) as u32).max(1),
        ((window.height as f32 * RENDER_SCALE) as u32).max(1),
    )
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_tex: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface has no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bgl"),
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
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let (tw, th) = render_size(size);
        let (frame_tex, bind_group) =
            create_frame_texture(&device, &bind_group_layout, &sampler, tw, th);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            frame_tex,
            bind_group,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        let (tw, th) = render_size(new_size);
        let (tex, bg) =
            create_frame_texture(&self.device, &self.bind_group_layout, &self.sampler, tw, th);
        self.frame_tex = tex;
        self.bind_group = bg;
    }

    /// Upload `raster` and draw it across the whole window.
    fn present(&mut self, raster: &Raster) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = raster.size();
        let tex_size = self.frame_tex.size();
        if tex_size.width == w && tex_size.height == h {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.frame_tex,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &raster.to_rgba8(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                tex_size,
            );
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
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
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_frame_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("frame_tex"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blit_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind_group)
}

/// Audio session and its device. The cpal stream opens on the first click.
struct NativeAudio {
    session: AudioSession,
    backend: Option<CpalBackend>,
}

impl NativeAudio {
    fn start(&mut self) {
        if self.session.is_started() {
            return;
        }
        let backend = self.backend.get_or_insert_with(CpalBackend::new);
        if backend.is_live() {
            self.session.start(backend);
        }
    }

    fn teardown(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            self.session.teardown(backend);
        }
    }

    fn with_live(&mut self, f: impl FnOnce(&mut AudioSession, &mut CpalBackend)) {
        if !self.session.is_started() {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            f(&mut self.session, backend);
        }
    }
}

fn wire_callbacks(field: &mut SonicField<Raster>, audio: &Rc<RefCell<NativeAudio>>) {
    let callbacks = field.callbacks_mut();
    let audio_zones = audio.clone();
    callbacks.set_on_proximity(move |map, now_ms| {
        audio_zones
            .borrow_mut()
            .with_live(|session, backend| session.update_zones(map, now_ms, backend));
    });
    let audio_ping = audio.clone();
    callbacks.set_on_center(move |species, now_ms| {
        audio_ping.borrow_mut().with_live(|session, backend| {
            if let Some(hz) = session.ping(species, now_ms, backend) {
                log::info!("[ping] {} at {:.1} Hz", species.id, hz);
            }
        });
    });
    let audio_depth = audio.clone();
    callbacks.set_on_depth(move |depth| {
        audio_depth
            .borrow_mut()
            .with_live(|session, backend| session.modulate_filter(depth, backend));
    });
}

/// Load `SONIC_CONFIG` (a JSON file path) over the defaults when set.
fn load_config() -> SonicConfig {
    let Ok(path) = std::env::var("SONIC_CONFIG") else {
        return SonicConfig::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|text| SonicConfig::from_json(&text));
    match loaded {
        Ok(cfg) => {
            log::info!("[config] loaded {}", path);
            cfg
        }
        Err(e) => {
            log::warn!("[config] ignoring {}: {:#}", path, e);
            SonicConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("sonic-field")
        .build(&event_loop)?;
    let mut gpu = pollster::block_on(GpuState::new(&window))?;

    let config = load_config();
    let audio = Rc::new(RefCell::new(NativeAudio {
        session: AudioSession::new(config.mixer.clone(), config.ping.clone()),
        backend: None,
    }));
    let (rw, rh) = render_size(window.inner_size());
    let mut screen = Raster::new(rw, rh);
    let mut field = SonicField::new(
        Catalog::builtin(),
        config,
        Raster::new(rw, rh),
        Raster::new(rw, rh),
    );
    wire_callbacks(&mut field, &audio);

    let clock = Instant::now();
    let mut pointer = Vec2::splat(-10_000.0);
    let mut dragging = false;
    let mut title = String::new();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                let (w, h) = render_size(size);
                screen = Raster::new(w, h);
                field.resize(Raster::new(w, h), Raster::new(w, h));
            }
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                pointer = Vec2::new(position.x as f32, position.y as f32) * RENDER_SCALE;
            }
            WindowEvent::CursorLeft { .. } => pointer = Vec2::splat(-10_000.0),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                dragging = state == ElementState::Pressed;
                if dragging {
                    audio.borrow_mut().start();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                    && audio.borrow().session.is_started()
                {
                    audio.borrow_mut().teardown();
                    field.reset_session_state();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let (w, h) = screen.size();
            let report = field.frame(
                FrameInput {
                    pointer,
                    dragging,
                    viewport: Viewport::new(w as f32, h as f32),
                    now_ms: clock.elapsed().as_secs_f64() * 1000.0,
                },
                &mut screen,
            );
            let hud = DepthReadout::new(report.depth).lines().join("  ");
            if hud != title {
                gpu.window.set_title(&format!("sonic-field  {hud}"));
                title = hud;
            }
            match gpu.present(&screen) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}
