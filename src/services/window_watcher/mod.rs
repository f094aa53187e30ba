//! ClientWatcher service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for observing the active
//! window through external X11 tools and turning what they see into
//! WindowEvent(s). Which windows float or change group is decided exclusively by
//! ClientRules; the watcher just applies the resulting actions.

mod wmctrl;
mod xdotool;
mod xprop;
mod watcher;
mod r#trait;

pub use self::r#trait::create_client_watcher;
