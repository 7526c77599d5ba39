//! Wavespeed Core
//!
//! Core types for the Wavespeed image-generation client.
//!
//! This crate contains:
//! - Domain types: the prediction record and its lifecycle states
//! - DTOs: wire shapes returned by the Wavespeed HTTP API
//! - Input: typed builders for model input payloads

pub mod domain;
pub mod dto;
pub mod input;
