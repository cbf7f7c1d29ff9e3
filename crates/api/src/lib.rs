//! `blendcraft-api` — HTTP surface over the crafting core.

pub mod app;
