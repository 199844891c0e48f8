//! Canales de notificación
//!
//! Traits `EmailSender` y `SmsSender` con implementaciones reales (Resend,
//! Twilio) y builders puros de mensajes. Los servicios de sweep y retry
//! dependen de los traits, nunca de las implementaciones.

pub mod email;
pub mod sms;

pub use email::{
    build_digest_email, build_expired_email, AlertContext, DigestItem, EmailSender,
    ResendEmailSender,
};
pub use sms::{build_expired_sms, SmsSender, TwilioSmsSender};
