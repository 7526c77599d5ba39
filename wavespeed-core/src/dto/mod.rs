//! Data Transfer Objects for the Wavespeed HTTP API
//!
//! Wire shapes exactly as the service returns them. They are converted into
//! domain types before being handed to callers, so loose fields (empty error
//! strings, outputs on unfinished predictions) never leak past this layer.

pub mod prediction;
