//! Error types surfaced by the crate.
//!
//! Runtime conditions that the simulation tolerates (stale chunk results,
//! chunks without a ready mesh, degenerate geometry) are not errors and never
//! appear here. Only startup configuration, graphics setup and worker-pool
//! failures do.

/// Errors that can occur when loading or validating the session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse the JSON content.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but holds a value the simulation cannot run with.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Errors raised by the chunk streaming pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StreamerError {
    /// Every generation worker hung up, so no further chunks can be produced.
    #[error("all chunk generation workers have disconnected")]
    WorkersDisconnected,
}

/// Errors raised while creating the window and the GPU context.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The window could not back a rendering surface.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter can present to the surface.
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device.
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format.
    #[error("surface supports no texture formats")]
    NoSurfaceFormat,
}
