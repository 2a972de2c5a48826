//! Data types for the factsheet weights pipeline.

pub mod cache;
pub mod config;
pub mod constituent;
pub mod mapping;
pub mod provider;
pub mod result;
