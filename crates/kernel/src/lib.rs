//! Core traits, settings, and module registry for vitrine.

pub mod command;
pub mod module;
pub mod notification;
pub mod registry;
pub mod response;
pub mod settings;

pub use command::{dispatch, CommandHandler};
pub use module::{InitCtx, Module};
pub use notification::{Notification, NotificationContext, NotificationKind};
pub use registry::ModuleRegistry;
pub use response::GenericResponse;
