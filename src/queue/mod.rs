pub mod broker;

pub use broker::{BuildBroker, BuildJob};
