//! Host-side registration for bridged classes.
//!
//! - [`PropertyInfo`], [`MethodInfo`] and [`SignalInfo`] describe members in the
//!   shape the host's registration ABI expects.
//! - [`ClassRegistrar`] is the registration service generated glue calls into;
//!   [`ClassDb`] is an in-memory host implementing it, with name-based dispatch.

mod class_db;
mod property;
mod registrar;

pub use class_db::ClassDb;
pub use property::{MethodFlags, MethodInfo, PropertyHint, PropertyInfo, PropertyUsage, SignalInfo};
pub use registrar::{ClassRegistrar, MethodFn};
