//! Live feed and alert notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; the ingestion gate's [`Publisher`].
//! - [`delivery`]: external delivery channels (SMTP e-mail).
//! - [`AlertMailer`]: background subscriber that e-mails every new alert.
//!
//! [`Publisher`]: thermowatch_core::ingest::Publisher

pub mod bus;
pub mod delivery;
pub mod mailer;

pub use bus::EventBus;
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use mailer::AlertMailer;
