//! # sla-watch
//!
//! A terminal dashboard and library for tracking the health of monitored HTTP
//! services through a status API.
//!
//! The status server performs the checks; this crate keeps a live client-side
//! view of them. It polls the service roster and each service's recent check
//! history, derives uptime, latency and severity, and lets the user add and
//! delete services.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │  app    │───▶│  engine   │───▶│  data   │───▶│    ui    │ │
//! │  │ (input) │    │(Dashboard)│    │(metrics)│    │(ratatui) │ │
//! │  └─────────┘    └─────┬─────┘    └─────────┘    └──────────┘ │
//! │                       │                                      │
//! │                       ▼                                      │
//! │                  ┌─────────┐                                 │
//! │                  │   api   │◀── HttpStatusApi (reqwest)      │
//! │                  └─────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`api`]**: Wire types and the [`StatusApi`] trait, with an HTTP implementation
//! - **[`engine`]**: Adaptive history pollers, the roster poller, add/delete
//!   commands, card interaction state and the [`Dashboard`] that owns it all
//! - **[`data`]**: History storage and the uptime/latency/severity calculations
//! - **[`config`]**: Layered settings (file, environment, command line)
//! - **[`app`]** / **[`events`]** / **[`ui`]**: The terminal front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default local status server
//! sla-watch
//!
//! # Point at another server and log at debug level
//! sla-watch --api-url https://status.example.com/api/v1 --log-level debug
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use sla_watch::{Dashboard, EngineConfig, HttpStatusApi};
//!
//! # tokio_test::block_on(async {
//! let api = HttpStatusApi::builder()
//!     .endpoint("http://localhost:8000/api/v1")
//!     .build()
//!     .unwrap();
//!
//! let mut dashboard = Dashboard::new(Arc::new(api), EngineConfig::default());
//! dashboard.start();
//!
//! while dashboard.next_event().await {
//!     for card in dashboard.cards() {
//!         println!("{} {:?}", card.service.name, card.aggregate.uptime_pct);
//!     }
//! }
//! # });
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod ui;

// Re-export main types for convenience
pub use api::{HealthCheckRecord, HttpStatusApi, Service, ServiceId, StatusApi};
pub use app::App;
pub use config::Settings;
pub use data::{AggregateView, HistoryStore, Severity};
pub use engine::{Dashboard, EngineConfig, EngineEvent};
pub use error::{ApiError, CommandError, ValidationError};
