//! The instruction contract consumed by the transaction compiler.

use serde::{Deserialize, Serialize};

use crate::error::SolError;
use crate::keys::PublicKey;

/// One account reference within an instruction: which account, whether it
/// must sign, and whether the program may modify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference.
    pub fn new(pubkey: PublicKey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    pub fn new_readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// The capability every instruction exposes to the compiler: the program to
/// invoke, the accounts it touches, and its opaque parameter bytes.
///
/// Program-specific encoders implement this; the compiler only ever reads it.
pub trait Instruction {
    fn program_id(&self) -> PublicKey;
    fn accounts(&self) -> Vec<AccountMeta>;
    fn data(&self) -> Result<Vec<u8>, SolError>;
}

/// A plain instruction whose data bytes are already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub program_id: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl RawInstruction {
    pub fn new(program_id: PublicKey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        RawInstruction {
            program_id,
            accounts,
            data,
        }
    }
}

impl Instruction for RawInstruction {
    fn program_id(&self) -> PublicKey {
        self.program_id
    }

    fn accounts(&self) -> Vec<AccountMeta> {
        self.accounts.clone()
    }

    fn data(&self) -> Result<Vec<u8>, SolError> {
        Ok(self.data.clone())
    }
}
