//! Application event loop.
//!
//! All viewer state lives in [`AppState`] and is only touched from the winit
//! callbacks of [`App`]. Work that has to wait (loading the mesh at startup,
//! fetching textures afterwards) runs on the async runtime of the platform and
//! reports back through the event loop proxy as a [`ViewerEvent`].
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the GPU context and loads the scene
//!    (blocking natively, in a local task on the web)
//! 2. texture fetches started while the scene is built complete one by one and
//!    arrive as `TextureLoaded` / `TextureFailed`
//! 3. every `RedrawRequested` renders a frame and schedules the next one

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    camera::{FrameUniform, OrbitCamera, Projection, world_matrix},
    config::{LightConfig, ViewerConfig},
    context::Context,
    controls::DragRotation,
    data_structures::model::DrawPart,
    resources::{
        AssetSource, load_obj,
        texture::{TextureFetcher, TextureId, load_image},
    },
    scene::GpuScene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[derive(Debug)]
pub enum ViewerEvent {
    TextureLoaded {
        id: TextureId,
        image: image::DynamicImage,
    },
    TextureFailed {
        id: TextureId,
        error: anyhow::Error,
    },
    /// The web init task finished.
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<anyhow::Result<AppState>>),
}

/// Fetches textures in the background and posts the result to the event loop.
struct ProxyFetcher {
    proxy: EventLoopProxy<ViewerEvent>,
    assets: AssetSource,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Handle,
}

impl TextureFetcher for ProxyFetcher {
    fn fetch(&mut self, id: TextureId, path: &str) {
        let proxy = self.proxy.clone();
        let assets = self.assets.clone();
        let path = path.to_string();
        let task = async move {
            let event = match load_image(&assets, &path).await {
                Ok(image) => ViewerEvent::TextureLoaded { id, image },
                Err(error) => ViewerEvent::TextureFailed { id, error },
            };
            if proxy.send_event(event).is_err() {
                log::debug!("The event loop closed before {path} arrived");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.runtime.spawn(task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Everything the render loop owns once startup succeeded.
#[derive(Debug)]
pub struct AppState {
    ctx: Context,
    scene: GpuScene,
    controls: DragRotation,
    camera: OrbitCamera,
    projection: Projection,
    light: LightConfig,
    started: Instant,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        config: ViewerConfig,
        mut fetcher: ProxyFetcher,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config.clear_colour).await?;
        let asset = load_obj(&config.assets, &config.obj_path).await?;
        let scene = GpuScene::build(&ctx, asset, &config, &mut fetcher)?;

        let framing = &scene.framing;
        let camera = OrbitCamera::new(framing.target, framing.radius);
        let projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            config.camera.fovy,
            framing.z_near,
            framing.z_far,
        );
        let mut controls = DragRotation::new(config.controls.rotation_sensitivity);
        if !config.controls.start_animated {
            controls.pause();
        }

        Ok(Self {
            ctx,
            scene,
            controls,
            camera,
            projection,
            light: config.light,
            started: Instant::now(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.projection.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        let size = self.ctx.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if !self.is_surface_configured
            || size.width != self.ctx.config.width
            || size.height != self.ctx.config.height
        {
            self.resize(size.width, size.height);
        }

        let world = world_matrix(
            &self.controls,
            self.started.elapsed().as_secs_f32(),
            self.scene.framing.center_offset,
        );
        let uniform = FrameUniform::new(&self.projection, &self.camera, world, &self.light);
        self.ctx.frame.write(&self.ctx.queue, &uniform);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.ctx.pipeline);
            for part in &self.scene.parts {
                render_pass.draw_part(part, &self.ctx.frame.bind_group);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn on_texture(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::TextureLoaded { id, image } => {
                if let Err(error) = self.scene.install_texture(&self.ctx, id, &image) {
                    self.scene.texture_failed(id, &error);
                }
            }
            ViewerEvent::TextureFailed { id, error } => self.scene.texture_failed(id, &error),
            #[cfg(target_arch = "wasm32")]
            ViewerEvent::Initialized(_) => {
                log::warn!("The viewer was initialized twice, ignoring the second state");
            }
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    state: Option<AppState>,
    initializing: bool,
    // texture events that overtook the init message
    pending: Vec<ViewerEvent>,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            initializing: false,
            pending: Vec::new(),
            startup_error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("The viewer could not start: {error:#}");
        self.startup_error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        for event in self.pending.drain(..) {
            state.on_texture(event);
        }
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().context("No browser window")?;
            let document = window.document().context("No document")?;
            let canvas = document
                .get_element_by_id(CANVAS_ID)
                .with_context(|| format!("No element with id #{CANVAS_ID}"))?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(window_attributes)
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.initializing {
            return;
        }

        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(error) => return self.fail(event_loop, error),
        };

        let fetcher = ProxyFetcher {
            proxy: self.proxy.clone(),
            assets: self.config.assets.clone(),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: self.async_runtime.handle().clone(),
        };
        let init_future = AppState::new(window, self.config.clone(), fetcher);
        self.initializing = true;

        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = self.async_runtime.block_on(init_future);
            self.initializing = false;
            match result {
                Ok(state) => self.start(state),
                Err(error) => self.fail(event_loop, error),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy
                    .send_event(ViewerEvent::Initialized(Box::new(result)))
                    .is_err()
                {
                    log::error!("The event loop closed during startup");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        #[cfg(target_arch = "wasm32")]
        if let ViewerEvent::Initialized(result) = event {
            // This is the message from our wasm `spawn_local`
            self.initializing = false;
            match *result {
                Ok(state) => self.start(state),
                Err(error) => self.fail(event_loop, error),
            }
            return;
        }
        let _ = event_loop;

        match &mut self.state {
            Some(state) => state.on_texture(event),
            None => self.pending.push(event),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.controls.handle_window_event(&event);

        match event {
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }
}

/// Open the viewer window and block until it is closed.
///
/// Returns the startup error if the GPU or the scene could not be set up.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "Could not initialize logger: {e}"
            )));
        }
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
