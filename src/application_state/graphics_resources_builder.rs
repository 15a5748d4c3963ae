//! # Graphics Resources Builder
//!
//! This module creates the window and the wgpu context the viewer renders with. Creation is
//! asynchronous on the web, so the result is delivered back to the event loop as a user event.
//!
//! The main components are:
//! - `Graphics`: the window plus surface, device and queue
//! - `GraphicsBuilder`: kicks off initialization and sends the result through the event loop
//! - `MaybeGraphics`: the stages of that hand-off

use std::future::Future;
use std::sync::Arc;

use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::error::ViewerError;

#[cfg(target_family = "wasm")]
use crate::CANVAS_ID;

/// Outcome of graphics initialization, as delivered to the event loop.
pub type GraphicsResult = Result<Graphics, ViewerError>;

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    pub window: Arc<Window>,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    /// Whether the surface already has a real size; on the web the canvas reports its size
    /// with the first resize event instead
    pub is_surface_configured: bool,
}

/// Creates the window synchronously and everything GPU-side asynchronously.
fn create_graphics(
    event_loop: &ActiveEventLoop,
) -> Result<impl Future<Output = GraphicsResult> + 'static, ViewerError> {
    #[allow(unused_mut)]
    let mut window_attrs = Window::default_attributes().with_title("Voxel Viewer");

    #[cfg(target_family = "wasm")]
    {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CANVAS_ID))
            .ok_or(ViewerError::SurfaceNotFound(CANVAS_ID))?;
        let html_canvas_element = canvas
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| ViewerError::SurfaceNotFound(CANVAS_ID))?;
        window_attrs = window_attrs.with_canvas(Some(html_canvas_element));
    }

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .map_err(|e| ViewerError::WindowCreation(e.to_string()))?,
    );

    // The instance is a handle to our GPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        #[cfg(not(target_family = "wasm"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_family = "wasm")]
        backends: wgpu::Backends::GL | wgpu::Backends::BROWSER_WEBGPU,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance
        .create_surface(window.clone())
        .map_err(|e| ViewerError::Surface(e.to_string()))?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::Adapter(e.to_string()))?;

        let required_limits = if cfg!(target_family = "wasm") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| ViewerError::Device(e.to_string()))?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| ViewerError::Surface("surface reports no formats".to_string()))?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let is_surface_configured = size.width > 0 && size.height > 0;
        if is_surface_configured {
            surface.configure(&device, &surface_config);
        }

        info!(
            "Graphics ready: {} ({:?})",
            adapter.get_info().name,
            surface_format
        );

        Ok(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
            is_surface_configured,
        })
    })
}

/// Helper struct for managing the asynchronous initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsResult>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume so initialization can start
    Builder(GraphicsBuilder),
    /// Initialized, waiting for a usable surface size
    Graphics(Graphics),
    /// Handed over to the running application
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder that reports back through `event_loop_proxy`.
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsResult>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Initiates graphics initialization and sends the result through the event loop.
    ///
    /// Calling this again after the first time does nothing.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx_fut = match create_graphics(event_loop) {
            Ok(gfx_fut) => gfx_fut,
            Err(err) => {
                send(&event_loop_proxy, Err(err));
                return;
            }
        };

        #[cfg(target_family = "wasm")]
        wasm_bindgen_futures::spawn_local(async move {
            send(&event_loop_proxy, gfx_fut.await);
        });

        #[cfg(not(target_family = "wasm"))]
        send(&event_loop_proxy, pollster::block_on(gfx_fut));
    }
}

fn send(proxy: &EventLoopProxy<GraphicsResult>, result: GraphicsResult) {
    if proxy.send_event(result).is_err() {
        log::error!("Event loop closed before graphics initialization finished");
    }
}
