//! # participation-gateway
//!
//! REST API and WebSocket gateway for admission control of
//! capacity-limited events with moderated participation requests.
//!
//! Users create events, administrators publish them, and other users send
//! participation requests. The gateway guarantees that an event with a
//! positive participant limit never holds more confirmed requests than its
//! limit, even under concurrent requests and moderation.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Feed (ws/)
//!     │
//!     ├── EventService / RequestService / UserService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── admit / allocate rules (domain/)
//!     ├── EventCatalog, RequestStore (per-event ledgers), UserCatalog
//!     │
//!     └── PostgreSQL journal (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
