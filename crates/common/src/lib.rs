//! Common types shared across the shell crates.
//!
//! - Error type
//! - The interface to the embedded browser engine
//! - The UI dispatch queue engine callbacks are marshaled onto

pub mod dispatch;
pub mod engine;
pub mod error;

pub use dispatch::{DispatchQueue, Poster};
pub use engine::{
    BrowserHandle, BrowserId, ClientId, Engine, EngineBackend, EngineClient, EngineConnection,
    EngineEvent, EngineSettings, EventSink, FocusDirection, FrameId, LifecycleState,
    MessageRouterConfig, SurfaceHandle,
};
pub use error::{ShellError, ShellResult};
