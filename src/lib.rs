pub mod api;
pub mod builder;
pub mod config;
pub mod humanize;
pub mod naming;
pub mod observability;
pub mod queue;
pub mod registry;
pub mod worker;
