//! System Program instruction builders and decoder.
//!
//! Instruction data is a little-endian u32 tag followed by the fixed-layout
//! parameters of the variant.

use std::fmt;

use sol_core::{
    AccountMeta, InstructionDecoderRegistry, PublicKey, RawInstruction, SolError,
};

/// The System Program public key: 32 zero bytes, Base58
/// `11111111111111111111111111111111`.
pub const PROGRAM_ID: PublicKey = PublicKey::new([0u8; 32]);

const TAG_CREATE_ACCOUNT: u32 = 0;
const TAG_ASSIGN: u32 = 1;
const TAG_TRANSFER: u32 = 2;

/// Move `lamports` from `from` to `to`.
pub fn transfer(from: &PublicKey, to: &PublicKey, lamports: u64) -> RawInstruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TAG_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    RawInstruction::new(
        PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    )
}

/// Create `new_account` owned by `owner`, funded with `lamports` and sized
/// to `space` bytes. Both the funding account and the new account sign.
pub fn create_account(
    from: &PublicKey,
    new_account: &PublicKey,
    lamports: u64,
    space: u64,
    owner: &PublicKey,
) -> RawInstruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&TAG_CREATE_ACCOUNT.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    RawInstruction::new(
        PROGRAM_ID,
        vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*new_account, true),
        ],
        data,
    )
}

/// Assign `account` to a new `owner` program.
pub fn assign(account: &PublicKey, owner: &PublicKey) -> RawInstruction {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&TAG_ASSIGN.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    RawInstruction::new(
        PROGRAM_ID,
        vec![AccountMeta::new(*account, true)],
        data,
    )
}

/// A decoded System Program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemInstruction {
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: PublicKey,
    },
    Assign {
        owner: PublicKey,
    },
    Transfer {
        lamports: u64,
    },
}

impl SystemInstruction {
    /// Decode instruction data by its tag.
    pub fn decode(data: &[u8]) -> Result<Self, SolError> {
        let (tag, rest) = read_u32(data)?;
        match tag {
            TAG_CREATE_ACCOUNT => {
                let (lamports, rest) = read_u64(rest)?;
                let (space, rest) = read_u64(rest)?;
                let (owner, _) = read_pubkey(rest)?;
                Ok(SystemInstruction::CreateAccount {
                    lamports,
                    space,
                    owner,
                })
            }
            TAG_ASSIGN => {
                let (owner, _) = read_pubkey(rest)?;
                Ok(SystemInstruction::Assign { owner })
            }
            TAG_TRANSFER => {
                let (lamports, _) = read_u64(rest)?;
                Ok(SystemInstruction::Transfer { lamports })
            }
            other => Err(SolError::UnknownInstructionTag(other)),
        }
    }
}

impl fmt::Display for SystemInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemInstruction::CreateAccount {
                lamports,
                space,
                owner,
            } => write!(
                f,
                "System::CreateAccount lamports={lamports} space={space} owner={owner}"
            ),
            SystemInstruction::Assign { owner } => {
                write!(f, "System::Assign owner={owner}")
            }
            SystemInstruction::Transfer { lamports } => {
                write!(f, "System::Transfer lamports={lamports}")
            }
        }
    }
}

/// Register the System Program decoder.
pub fn register_decoder(registry: &mut InstructionDecoderRegistry) -> Result<(), SolError> {
    registry.register(PROGRAM_ID, |_accounts, data| {
        SystemInstruction::decode(data)
            .map(|instruction| Box::new(instruction) as Box<dyn fmt::Display + Send + Sync>)
    })
}

fn read_u32(data: &[u8]) -> Result<(u32, &[u8]), SolError> {
    let bytes: [u8; 4] = data
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or(SolError::UnexpectedEnd("system instruction tag"))?;
    Ok((u32::from_le_bytes(bytes), &data[4..]))
}

fn read_u64(data: &[u8]) -> Result<(u64, &[u8]), SolError> {
    let bytes: [u8; 8] = data
        .get(..8)
        .and_then(|s| s.try_into().ok())
        .ok_or(SolError::UnexpectedEnd("system instruction field"))?;
    Ok((u64::from_le_bytes(bytes), &data[8..]))
}

fn read_pubkey(data: &[u8]) -> Result<(PublicKey, &[u8]), SolError> {
    let bytes = data
        .get(..32)
        .ok_or(SolError::UnexpectedEnd("system instruction pubkey"))?;
    Ok((
        PublicKey::from_bytes(bytes)?,
        &data[32..],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_core::Instruction as _;

    fn pk(n: u8) -> PublicKey {
        PublicKey::new([n; 32])
    }

    #[test]
    fn program_id_is_the_zero_key() {
        assert!(PROGRAM_ID.is_zero());
        assert_eq!(PROGRAM_ID.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn transfer_data_is_12_bytes() {
        let ix = transfer(&pk(1), &pk(2), 1_000_000);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
        assert_eq!(ix.program_id(), PROGRAM_ID);
    }

    #[test]
    fn transfer_account_roles() {
        let ix = transfer(&pk(1), &pk(2), 500);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn transfer_decode_roundtrip() {
        let ix = transfer(&pk(1), &pk(2), 42);
        assert_eq!(
            SystemInstruction::decode(&ix.data).unwrap(),
            SystemInstruction::Transfer { lamports: 42 }
        );
    }

    #[test]
    fn create_account_decode_roundtrip() {
        let ix = create_account(&pk(1), &pk(2), 2_039_280, 165, &pk(7));
        assert_eq!(ix.data.len(), 52);
        assert_eq!(
            SystemInstruction::decode(&ix.data).unwrap(),
            SystemInstruction::CreateAccount {
                lamports: 2_039_280,
                space: 165,
                owner: pk(7),
            }
        );
    }

    #[test]
    fn assign_decode_roundtrip() {
        let ix = assign(&pk(3), &pk(9));
        assert_eq!(
            SystemInstruction::decode(&ix.data).unwrap(),
            SystemInstruction::Assign { owner: pk(9) }
        );
    }

    #[test]
    fn unknown_tag_fails() {
        let mut data = 7u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 8]);
        assert_eq!(
            SystemInstruction::decode(&data),
            Err(SolError::UnknownInstructionTag(7))
        );
    }

    #[test]
    fn truncated_data_fails() {
        assert!(SystemInstruction::decode(&[2, 0]).is_err());
        assert!(SystemInstruction::decode(&[2, 0, 0, 0, 1]).is_err());
        assert!(SystemInstruction::decode(&[]).is_err());
    }

    #[test]
    fn display_names_the_variant() {
        let text = SystemInstruction::Transfer { lamports: 9 }.to_string();
        assert_eq!(text, "System::Transfer lamports=9");
    }

    #[test]
    fn decoder_registration() {
        let mut registry = InstructionDecoderRegistry::new();
        register_decoder(&mut registry).unwrap();

        let ix = transfer(&pk(1), &pk(2), 77);
        let decoded = registry.decode(&PROGRAM_ID, &ix.accounts, &ix.data).unwrap();
        assert_eq!(decoded.to_string(), "System::Transfer lamports=77");

        // Double registration of the same program must fail.
        assert_eq!(
            register_decoder(&mut registry),
            Err(SolError::DuplicateDecoderRegistration(PROGRAM_ID))
        );
    }
}
