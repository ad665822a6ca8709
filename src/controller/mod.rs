//! Client-side lifecycle controller for the Mini Shell demo container.
//!
//! # Architecture
//!
//! ```text
//!   Presenter ──action──▶ LifecycleController ──request──▶ ContainerApi
//!       ▲                    │          │                      │
//!       │                    │          └── LogPoller ◀────────┤ (every 2s)
//!       └──── PanelView / TerminalUpdate / LogModal ◀──────────┘
//!                                       │
//!                                 format_logs
//! ```
//!
//! The controller exclusively owns one [`ContainerSession`]. The poller is a
//! cancellable task whose handle lives in that session.

mod guidance;
mod lifecycle;
mod poller;
mod presenter;
mod session;

pub use guidance::{Guidance, classify_failure};
pub use lifecycle::LifecycleController;
pub use presenter::{ButtonGates, LogModal, PanelView, Presenter, TerminalUpdate};
pub use session::{
    CONTAINER_NAME_PREFIX, ContainerSession, ContainerStatus, ScheduledTask, SessionSnapshot,
    SessionToken, container_id_prefix,
};
