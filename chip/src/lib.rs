//! A CHIP-8 virtual machine: the decoder, the executor, the timers and a
//! threaded runner, with the host devices left to the caller.
pub mod chip8;
pub mod config;
pub mod definitions;
pub mod devices;
pub mod display;
pub mod memory;
pub mod opcode;
pub mod registers;
pub mod resources;
pub mod timer;
mod error;

// reexporting for convinience
mod runner;
pub use error::*;
pub use runner::*;
