//! Domain utility functions

pub mod field_mapper;
