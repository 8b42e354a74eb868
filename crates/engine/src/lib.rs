//! Sirius engine library.
//!
//! Server side of the Happy Vertical People Transporter game.
//!
//! ## Structure
//!
//! - `use_cases/` - Persona replies and running game sessions
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod prompts;
pub mod use_cases;

pub use app::App;
pub use config::AppConfig;
