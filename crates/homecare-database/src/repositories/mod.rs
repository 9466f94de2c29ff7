//! PostgreSQL implementations of the store contracts.

pub mod notification;
pub mod preference;
pub mod template;

pub use notification::{NotificationRepository, PgDrainTransaction};
pub use preference::PreferenceRepository;
pub use template::TemplateRepository;
