//! Redirect delivery and presentation
//!
//! Desktop builds register a loopback redirect URI and run
//! [`LoopbackCallbackServer`]; mobile and deep-link builds feed the callback
//! URL straight into `AuthOrchestrator::resume_redirect`. Either way the
//! authorization page is shown through a [`PresentationContext`] such as
//! [`SystemBrowser`].
//!
//! [`PresentationContext`]: scoutgate_core::PresentationContext

mod browser;
mod callback_server;

pub use browser::SystemBrowser;
pub use callback_server::{is_loopback_redirect, LoopbackCallbackServer};
