//! Bring-up and shutdown of the blink device.
//!
//! Resources are acquired in a fixed order and released in the reverse
//! order, both on a failed bring-up and on shutdown:
//!
//! ```text
//!  bring-up:  scheduler ─▶ callback slot ─▶ control surface ─▶ pin
//!  shutdown:  pin LOW ─▶ release pin ─▶ unregister surface ─▶ flush + destroy scheduler
//! ```
//!
//! Shutdown runs unconditionally, including while blinking, and also when a
//! [`BlinkDevice`] is dropped without an explicit [`BlinkDevice::shutdown`].

use std::sync::Arc;

use log::{error, info, warn};

use crate::app::control::ControlSurface;
use crate::app::controller::BlinkController;
use crate::app::ports::{
    EventSink, NodeHandle, PinDriver, SchedulerError, SurfaceRegistry, TaskScheduler,
};
use crate::config::BlinkConfig;
use crate::error::{Error, Resource, Result};

/// Controller type a device runs: the line comes from `D`, the scheduler is
/// shared between the device and the controller.
pub type DeviceController<D, S, E> = BlinkController<<D as PinDriver>::Line, Arc<S>, E>;

/// A running blink device and every resource it holds.
pub struct BlinkDevice<D, S, R, E>
where
    D: PinDriver,
    S: TaskScheduler + 'static,
    R: SurfaceRegistry,
    E: EventSink + 'static,
{
    scheduler: Arc<S>,
    surface: ControlSurface<D::Line, Arc<S>, E>,
    node: NodeHandle,
    pins: D,
    registry: R,
    torn_down: bool,
}

impl<D, S, R, E> BlinkDevice<D, S, R, E>
where
    D: PinDriver,
    S: TaskScheduler + 'static,
    R: SurfaceRegistry,
    E: EventSink + 'static,
{
    /// Acquire every resource and return a stopped device with its pin LOW.
    ///
    /// On failure everything acquired so far is released, newest first,
    /// before the error is returned.
    pub fn bring_up(
        config: &BlinkConfig,
        acquire_scheduler: impl FnOnce(&BlinkConfig) -> core::result::Result<S, SchedulerError>,
        mut registry: R,
        mut pins: D,
        sink: E,
    ) -> Result<Self> {
        config.validate()?;
        let interval = config.initial_interval()?;
        info!("Init blink device '{}' on gpio{}", config.device_name, config.pin);

        // ── 1. Scheduler ──────────────────────────────────────
        let scheduler = Arc::new(acquire_scheduler(config).map_err(|e| {
            error!("Can't start workqueue '{}': {}", config.workqueue_name, e);
            Error::ResourceUnavailable(Resource::Scheduler)
        })?);

        // ── 2. Callback slot ──────────────────────────────────
        let controller = match BlinkController::new(Arc::clone(&scheduler), sink, interval) {
            Ok(controller) => controller,
            Err(e) => {
                warn!("unwind: destroying workqueue");
                scheduler.flush_and_destroy();
                return Err(e);
            }
        };

        // ── 3. Control surface ────────────────────────────────
        let node = match registry.register(&config.class_name, &config.device_name) {
            Ok(node) => node,
            Err(e) => {
                error!("Can't create control node {}/{}: {}", config.class_name, config.device_name, e);
                warn!("unwind: destroying workqueue");
                drop(controller);
                scheduler.flush_and_destroy();
                return Err(e.into());
            }
        };

        // ── 4. Pin ────────────────────────────────────────────
        let line = match pins.acquire(config.pin) {
            Ok(line) => line,
            Err(e) => {
                error!("Chosen gpio {} is not usable: {}", config.pin, e);
                warn!("unwind: removing control node, destroying workqueue");
                registry.unregister(node);
                drop(controller);
                scheduler.flush_and_destroy();
                return Err(e.into());
            }
        };
        controller.attach_pin(line);

        info!("Blink device ready ({} ms)", interval.as_millis());
        Ok(Self {
            scheduler,
            surface: ControlSurface::new(controller),
            node,
            pins,
            registry,
            torn_down: false,
        })
    }

    /// Release everything in reverse order.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    pub fn surface(&self) -> &ControlSurface<D::Line, Arc<S>, E> {
        &self.surface
    }

    pub fn controller(&self) -> &Arc<DeviceController<D, S, E>> {
        self.surface.controller()
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn pins(&self) -> &D {
        &self.pins
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn scheduler(&self) -> &Arc<S> {
        &self.scheduler
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        info!("Exit blink device");

        // Forces LOW under the controller lock; a callback that runs later
        // finds no line to write.
        if let Some(line) = self.surface.controller().release_pin() {
            self.pins.release(line);
        }
        self.registry.unregister(self.node);
        self.scheduler.flush_and_destroy();
    }
}

impl<D, S, R, E> Drop for BlinkDevice<D, S, R, E>
where
    D: PinDriver,
    S: TaskScheduler + 'static,
    R: SurfaceRegistry,
    E: EventSink + 'static,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
