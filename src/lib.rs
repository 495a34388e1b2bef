//! fleetdash: a terminal dashboard for a fleet of messaging-gateway instances.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod model;
pub mod error;
pub mod config;
pub mod logging;
pub mod gateway;
pub mod create;
pub mod registry;
pub mod selection;
pub mod notifications;
pub mod webhook_editor;
pub mod modals;
pub mod dashboard;
pub mod poller;
pub mod fleet_controller;
pub mod view;
pub mod app;
