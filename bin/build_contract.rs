#![doc = "Binary for building wasm files from the farm contracts."]
#![no_std]
#![no_main]
#![allow(unused_imports, clippy::single_component_path_imports)]
use farm_core;
