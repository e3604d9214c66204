//! Binding between section descriptors and a host surface.

mod binder;
mod host;

pub use binder::{BinderSource, GridBinder};
pub use host::{GridHost, HostId, ScrollObserver};
