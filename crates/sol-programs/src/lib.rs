//! Instruction builders and decoders for well-known programs.
//!
//! Each module exposes the program id, builders returning
//! [`sol_core::RawInstruction`] values ready for the transaction compiler,
//! an explicit instruction enum decoded by an exhaustive tag match, and a
//! `register_decoder` hook for a [`sol_core::InstructionDecoderRegistry`].

pub mod memo;
pub mod system;
pub mod token;

use sol_core::{InstructionDecoderRegistry, SolError};

/// Register the decoders of every program in this crate.
pub fn register_default_decoders(
    registry: &mut InstructionDecoderRegistry,
) -> Result<(), SolError> {
    system::register_decoder(registry)?;
    token::register_decoder(registry)?;
    memo::register_decoder(registry)?;
    Ok(())
}
