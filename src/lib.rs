//! Taskdesk: task tracking core for a chat-driven team assistant.
//!
//! Admins create and assign tasks, workers move them through a status
//! machine, and a background scheduler flags overdue work and sends
//! deadline reminders. Every status or assignee change is recorded in an
//! append-only history.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`local_time`]: Display offset conversion and deadline parsing
//! - [`user`]: Users, roles and shared-secret sign-in
//! - [`task`]: Task lifecycle, authorization and history
//! - [`notification`]: Deadline sweep, reminders and delivery
//! - [`report`]: Statistics and report exports
//! - [`session`]: Per-conversation task draft forms
//! - [`config`]: Layered configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod local_time;
pub mod notification;
pub mod report;
pub mod session;
pub mod task;
pub mod telemetry;
pub mod user;
