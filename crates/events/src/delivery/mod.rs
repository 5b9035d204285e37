//! External delivery channels for alert notifications.

pub mod email;
