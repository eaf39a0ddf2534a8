//! Memo program: attach a UTF-8 note to a transaction.

use std::fmt;

use sol_core::{
    AccountMeta, InstructionDecoderRegistry, PublicKey, RawInstruction, SolError,
};

/// Memo Program id: `MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr`.
pub const PROGRAM_ID: PublicKey = PublicKey::new([
    0x05, 0x4a, 0x53, 0x5a, 0x99, 0x29, 0x21, 0x06, 0x4d, 0x24, 0xe8, 0x71, 0x60, 0xda, 0x38,
    0x7c, 0x7c, 0x35, 0xb5, 0xdd, 0xbc, 0x92, 0xbb, 0x81, 0xe4, 0x1f, 0xa8, 0x40, 0x41, 0x05,
    0x44, 0x8d,
]);

/// Build a memo instruction. The instruction data is the raw UTF-8 text;
/// `signers` optionally attest to the memo.
pub fn build_memo(memo: &str, signers: &[PublicKey]) -> RawInstruction {
    RawInstruction::new(
        PROGRAM_ID,
        signers
            .iter()
            .map(|signer| AccountMeta::new_readonly(*signer, true))
            .collect(),
        memo.as_bytes().to_vec(),
    )
}

/// A decoded memo: the UTF-8 text, lossily decoded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memo(pub String);

impl Memo {
    pub fn decode(data: &[u8]) -> Self {
        Memo(String::from_utf8_lossy(data).into_owned())
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memo: {}", self.0)
    }
}

/// Register the memo decoder.
pub fn register_decoder(registry: &mut InstructionDecoderRegistry) -> Result<(), SolError> {
    registry.register(PROGRAM_ID, |_accounts, data| {
        Ok(Box::new(Memo::decode(data)) as Box<dyn fmt::Display + Send + Sync>)
    })
}
