//! The drawing surface: window, GPU context and the mounted session.
//!
//! [`SurfaceManager::start`] creates the window and GPU resources with the
//! configured surface defaults; [`SurfaceManager::stop`] cancels the session
//! and releases them again. Between the two, the event loop forwards resize,
//! pointer and redraw events here.

use std::sync::Arc;

use log::{debug, info, warn};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::assets::DecodedImage;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::font::GlyphAtlas;
use crate::gpu::GpuContext;
use crate::input::{Input, PointerEvent};
use crate::layout::SurfaceInfo;
use crate::session::{CompletionHook, Session};
use crate::sprite_pass::SpritePass;

struct Surface {
    window: Arc<Window>,
    gpu: GpuContext,
    pass: SpritePass,
}

/// Owns the window, the GPU context and the current [`Session`].
pub struct SurfaceManager {
    config: AppConfig,
    surface: Option<Surface>,
    input: Input,
    session: Option<Session>,
}

impl SurfaceManager {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            surface: None,
            input: Input::new(),
            session: None,
        }
    }

    /// Create the window and GPU resources. Calling it twice is a no-op.
    pub fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }

        let window_attrs = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::SurfaceUnavailable(format!("cannot create window: {e}")))?,
        );
        let gpu = GpuContext::new(Arc::clone(&window))?;
        let mut pass = SpritePass::new(
            &gpu,
            self.config.surface.filter,
            self.config.surface.round_pixels,
        );

        let density = self.density(&window);
        pass.set_scale_factor(density as f32);
        self.input.set_scale_factor(density);

        info!(
            "surface started at {}x{} (density {:.2})",
            gpu.width(),
            gpu.height(),
            density
        );

        self.surface = Some(Surface { window, gpu, pass });
        self.load_font();
        Ok(())
    }

    /// Cancel the session and release the window and GPU context.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if let Some(mut surface) = self.surface.take() {
            surface.pass.release_textures();
            info!("surface stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.surface.is_some()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn window(&self) -> Option<&Window> {
        self.surface.as_ref().map(|s| s.window.as_ref())
    }

    fn density(&self, window: &Window) -> f64 {
        self.config
            .surface
            .pixel_density
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| window.scale_factor())
    }

    /// Current logical size and density.
    ///
    /// Before [`start`](Self::start) this is the configured window size.
    pub fn info(&self) -> SurfaceInfo {
        match &self.surface {
            Some(surface) => SurfaceInfo::from_physical(
                surface.gpu.width(),
                surface.gpu.height(),
                self.density(&surface.window),
            ),
            None => SurfaceInfo::new(self.config.width as f32, self.config.height as f32),
        }
    }

    /// Rasterize the label font at the current density.
    ///
    /// A missing or unreadable font is logged; the label is then not drawn.
    pub fn load_font(&mut self) {
        let Some(label) = &self.config.label else {
            return;
        };
        let density = self.info().scale_factor;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match GlyphAtlas::from_file(&label.font_path, label.font_size * density) {
            Ok(atlas) => {
                debug!("label font rasterized at {:.1}px", atlas.size());
                surface.pass.set_font(&surface.gpu, atlas);
            }
            Err(e) => warn!("{e}; the label will not be drawn"),
        }
    }

    /// Upload the decoded images and mount a new session on them.
    pub fn mount(&mut self, images: Vec<DecodedImage>, hook: CompletionHook) -> Result<()> {
        let info = self.info();
        let Some(surface) = self.surface.as_mut() else {
            return Err(Error::SurfaceUnavailable(
                "mount called before the surface started".into(),
            ));
        };

        if let Some(mut previous) = self.session.take() {
            previous.stop();
            surface.pass.release_textures();
        }

        let frames = images
            .iter()
            .map(|image| surface.pass.upload_image(&surface.gpu, image))
            .collect();
        debug!("uploaded {} texture(s)", surface.pass.texture_count());

        self.session = Some(Session::mount(self.config.clone(), frames, info, hook)?);
        Ok(())
    }

    /// Physical window size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.gpu.resize(width, height);

        let info = self.info();
        if let Some(session) = self.session.as_mut() {
            session.resize(info);
        }
    }

    /// The window moved to a display with a different density.
    pub fn scale_factor_changed(&mut self, scale_factor: f64) {
        if self.config.surface.pixel_density.is_some() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.pass.set_scale_factor(scale_factor as f32);
        }
        self.input.set_scale_factor(scale_factor);
        self.load_font();

        let info = self.info();
        if let Some(session) = self.session.as_mut() {
            session.resize(info);
        }
    }

    /// Feed a window event to the pointer tracker.
    pub fn handle_input(&mut self, event: &WindowEvent) {
        if let Some(PointerEvent::Down { position }) = self.input.handle_event(event) {
            match self.session.as_mut() {
                Some(session) => {
                    if session.pointer_down() {
                        debug!("exit triggered by press at {position}");
                    }
                }
                None => debug!("press at {position} before assets resolved"),
            }
        }
    }

    /// Advance the session by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(session) = self.session.as_mut() {
            session.tick(dt);
        }
    }

    pub fn request_redraw(&self) {
        if let Some(surface) = &self.surface {
            surface.window.request_redraw();
        }
    }

    /// Draw the current scene over the background color.
    pub fn render(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        surface.pass.clear();
        if let Some(session) = &self.session {
            if let Some(primary) = session.scene().primary() {
                surface.pass.sprite(primary);
            }
            if let Some(label) = session.scene().label() {
                surface.pass.label(label);
            }
        }

        let output = match surface.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated, reconfiguring");
                surface.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::SurfaceUnavailable(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            surface
                .gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Sprite Encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.surface.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            surface.pass.render(&surface.gpu, &mut render_pass);
        }

        surface.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl Drop for SurfaceManager {
    fn drop(&mut self) {
        self.stop();
    }
}
