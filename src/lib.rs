pub mod constants;
pub mod temp_utils;
pub mod element;
pub mod bond_spec;
pub mod molecule;
pub mod slag;
pub mod thermal;
pub mod mixture;
pub mod container;
pub mod config;
pub mod report;
pub mod network;
pub mod sim;
