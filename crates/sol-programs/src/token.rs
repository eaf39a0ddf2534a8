//! SPL Token instruction builders, decoder, and associated token account
//! derivation.

use std::fmt;

use sol_core::{
    find_program_address, AccountMeta, InstructionDecoderRegistry, PublicKey, RawInstruction,
    SolError,
};

/// SPL Token Program id: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`.
pub const PROGRAM_ID: PublicKey = PublicKey::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program id:
/// `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: PublicKey = PublicKey::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

const TAG_TRANSFER: u8 = 3;

/// Move `amount` token base units between token accounts. The `owner` of the
/// source account signs.
pub fn transfer(
    source: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    amount: u64,
) -> RawInstruction {
    let mut data = Vec::with_capacity(9);
    data.push(TAG_TRANSFER);
    data.extend_from_slice(&amount.to_le_bytes());

    RawInstruction::new(
        PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    )
}

/// Derive the associated token account for a wallet + mint pair: the PDA of
/// `[wallet, token program, mint]` under the associated token program.
pub fn derive_associated_token_address(
    wallet: &PublicKey,
    mint: &PublicKey,
) -> Result<PublicKey, SolError> {
    find_program_address(
        &[wallet.as_ref(), PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// A decoded SPL Token instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    Transfer { amount: u64 },
}

impl TokenInstruction {
    /// Decode instruction data by its single-byte tag.
    pub fn decode(data: &[u8]) -> Result<Self, SolError> {
        let (&tag, rest) = data
            .split_first()
            .ok_or(SolError::UnexpectedEnd("token instruction tag"))?;
        match tag {
            TAG_TRANSFER => {
                let bytes: [u8; 8] = rest
                    .get(..8)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(SolError::UnexpectedEnd("token transfer amount"))?;
                Ok(TokenInstruction::Transfer {
                    amount: u64::from_le_bytes(bytes),
                })
            }
            other => Err(SolError::UnknownInstructionTag(other as u32)),
        }
    }
}

impl fmt::Display for TokenInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenInstruction::Transfer { amount } => {
                write!(f, "Token::Transfer amount={amount}")
            }
        }
    }
}

/// Register the SPL Token decoder.
pub fn register_decoder(registry: &mut InstructionDecoderRegistry) -> Result<(), SolError> {
    registry.register(PROGRAM_ID, |_accounts, data| {
        TokenInstruction::decode(data)
            .map(|instruction| Box::new(instruction) as Box<dyn fmt::Display + Send + Sync>)
    })
}
