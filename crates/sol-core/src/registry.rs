//! Program id to instruction decoder mapping, used by display tooling to
//! reverse-decode the opaque data bytes of a compiled instruction.
//!
//! The registry is an explicit value: build one at startup, register every
//! program's decoder, then share it immutably (it is `Send + Sync`).
//! Registering the same program twice is a deterministic error, never a
//! panic, so a misconfigured startup fails cleanly.

use std::collections::HashMap;
use std::fmt;

use crate::error::SolError;
use crate::instruction::AccountMeta;
use crate::keys::PublicKey;

/// Decodes one instruction's accounts and data into a displayable value.
///
/// The accounts passed in are the ones resolved FOR THAT INSTRUCTION (see
/// [`crate::message::CompiledInstruction::resolve_accounts`]), not the
/// message's full account list.
pub type DecodeFn =
    fn(accounts: &[AccountMeta], data: &[u8]) -> Result<Box<dyn fmt::Display + Send + Sync>, SolError>;

#[derive(Default)]
pub struct InstructionDecoderRegistry {
    decoders: HashMap<PublicKey, DecodeFn>,
}

impl InstructionDecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `decoder` for `program_id`. Fails if one is already present.
    pub fn register(&mut self, program_id: PublicKey, decoder: DecodeFn) -> Result<(), SolError> {
        if self.decoders.contains_key(&program_id) {
            return Err(SolError::DuplicateDecoderRegistration(program_id));
        }
        self.decoders.insert(program_id, decoder);
        Ok(())
    }

    pub fn contains(&self, program_id: &PublicKey) -> bool {
        self.decoders.contains_key(program_id)
    }

    /// Decode an instruction of `program_id`.
    pub fn decode(
        &self,
        program_id: &PublicKey,
        accounts: &[AccountMeta],
        data: &[u8],
    ) -> Result<Box<dyn fmt::Display + Send + Sync>, SolError> {
        let decoder = self
            .decoders
            .get(program_id)
            .ok_or(SolError::DecoderNotFound(*program_id))?;
        decoder(accounts, data)
    }
}
