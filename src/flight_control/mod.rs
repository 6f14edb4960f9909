pub(crate) mod common;
pub(crate) mod configuration;
pub(crate) mod navigation;
pub(crate) mod orientation;
pub(crate) mod pilot;
pub(crate) mod steering;

pub use configuration::Configuration;
pub use pilot::Pilot;
