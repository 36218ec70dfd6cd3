#![allow(dead_code)]

pub mod mock_config;
pub mod mock_registry;
pub mod test_data_builder;
