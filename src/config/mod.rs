// ABOUTME: Configuration module grouping environment-derived runtime settings
// ABOUTME: Re-exports AppConfig and LogLevel for convenient access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

/// Environment-based configuration management
pub mod environment;

pub use environment::{AppConfig, LogLevel};
