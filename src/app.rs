use std::time::Instant;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::WindowId;

use crate::assets::{AssetLoader, DecodedImage};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::session::{CompletionHook, default_completion_hook};
use crate::surface::SurfaceManager;

/// Events posted to the event loop from other threads.
#[derive(Debug)]
pub enum AppEvent {
    /// The asset loader finished, successfully or not.
    AssetsLoaded(Result<Vec<DecodedImage>>),
}

/// Run the zoom effect with the default completion hook.
///
/// Blocks until the window is closed.
///
/// # Example
/// ```no_run
/// pixel_zoom::run(pixel_zoom::AppConfig::still("assets/full.png"))?;
/// # Ok::<(), pixel_zoom::Error>(())
/// ```
pub fn run(config: AppConfig) -> Result<()> {
    run_with_hook(config, default_completion_hook())
}

/// Run the zoom effect, calling `hook` once after the exit zoom completes.
pub fn run_with_hook(config: AppConfig, hook: CompletionHook) -> Result<()> {
    let event_loop = EventLoop::<AppEvent>::with_user_event()
        .build()
        .map_err(|e| Error::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ZoomApp::Pending {
        config,
        hook: Some(hook),
        proxy: event_loop.create_proxy(),
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::EventLoop(e.to_string()))?;

    match app {
        ZoomApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

enum ZoomApp {
    Pending {
        config: AppConfig,
        hook: Option<CompletionHook>,
        proxy: EventLoopProxy<AppEvent>,
    },
    Running {
        surface: SurfaceManager,
        hook: Option<CompletionHook>,
        _loader: AssetLoader,
        last_frame: Instant,
    },
    Failed(Error),
    Exited,
}

impl ZoomApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: Error) {
        error!("{e}");
        if let ZoomApp::Running { surface, .. } = self {
            surface.stop();
        }
        *self = ZoomApp::Failed(e);
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for ZoomApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ZoomApp::Pending {
            config,
            hook,
            proxy,
        } = self
        else {
            return;
        };

        let mut surface = SurfaceManager::new(config.clone());
        if let Err(e) = surface.start(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        let proxy = proxy.clone();
        let loader = AssetLoader::spawn(config.source.clone(), move |result| {
            if proxy.send_event(AppEvent::AssetsLoaded(result)).is_err() {
                warn!("event loop closed before assets arrived");
            }
        });
        let loader = match loader {
            Ok(loader) => loader,
            Err(e) => {
                surface.stop();
                self.fail(event_loop, e);
                return;
            }
        };

        let hook = hook.take();
        surface.request_redraw();
        *self = ZoomApp::Running {
            surface,
            hook,
            _loader: loader,
            last_frame: Instant::now(),
        };
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        let ZoomApp::Running { surface, hook, .. } = self else {
            return;
        };

        match event {
            AppEvent::AssetsLoaded(Ok(images)) => {
                let hook = hook.take().unwrap_or_else(default_completion_hook);
                if let Err(e) = surface.mount(images, hook) {
                    error!("{e}");
                }
            }
            // The window stays on its background color
            AppEvent::AssetsLoaded(Err(e)) => error!("{e}"),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ZoomApp::Running {
            surface,
            last_frame,
            ..
        } = self
        else {
            return;
        };

        surface.handle_input(&event);

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                surface.stop();
                *self = ZoomApp::Exited;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                surface.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                surface.scale_factor_changed(scale_factor);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                surface.tick(dt);
                if let Err(e) = surface.render() {
                    self.fail(event_loop, e);
                    return;
                }
                surface.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let ZoomApp::Running { surface, .. } = self {
            surface.stop();
        }
    }
}
