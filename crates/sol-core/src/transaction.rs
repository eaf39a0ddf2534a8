//! Signed transactions: signing, assembly, and the fluent builder.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compact::encode_compact_u16;
use crate::compile::compile_message;
use crate::error::SolError;
use crate::instruction::Instruction;
use crate::keys::{Hash, PrivateKey, PublicKey, Signature};
use crate::message::{AddressTables, Message};
use crate::wire::{decode_message, ByteReader};

/// Produce one signature per required signer of `message`.
///
/// The message is serialized exactly once and every signer signs that same
/// byte sequence, in `account_keys` order. Fails with
/// [`SolError::MissingSignerKey`] if `key_source` cannot supply a key.
pub fn sign_message<F>(message: &Message, key_source: F) -> Result<Vec<Signature>, SolError>
where
    F: Fn(&PublicKey) -> Option<PrivateKey>,
{
    let bytes = message.serialize()?;
    message
        .signer_keys()
        .iter()
        .map(|signer| {
            key_source(signer)
                .map(|key| key.sign(&bytes))
                .ok_or(SolError::MissingSignerKey(*signer))
        })
        .collect()
}

/// A message together with its signatures, one per required signer, in
/// `account_keys[0..num_required_signatures]` order. The first signature is
/// the transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Wrap a compiled message with zeroed signature slots.
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.header.num_required_signatures as usize;
        Transaction {
            signatures: vec![Signature::default(); slots],
            message,
        }
    }

    /// Compile-free constructor for fully signed transactions.
    pub fn new_signed<F>(message: Message, key_source: F) -> Result<Self, SolError>
    where
        F: Fn(&PublicKey) -> Option<PrivateKey>,
    {
        let signatures = sign_message(&message, key_source)?;
        Ok(Transaction {
            signatures,
            message,
        })
    }

    /// Sign with every required signer, failing if any key is unavailable.
    pub fn sign<F>(&mut self, key_source: F) -> Result<(), SolError>
    where
        F: Fn(&PublicKey) -> Option<PrivateKey>,
    {
        self.signatures = sign_message(&self.message, key_source)?;
        Ok(())
    }

    /// Fill the signature slots whose keys are available, leaving the rest
    /// untouched. Returns how many slots were signed.
    pub fn partial_sign<F>(&mut self, key_source: F) -> Result<usize, SolError>
    where
        F: Fn(&PublicKey) -> Option<PrivateKey>,
    {
        let bytes = self.message.serialize()?;
        let signers: Vec<PublicKey> = self.message.signer_keys().to_vec();
        self.signatures
            .resize(signers.len(), Signature::default());

        let mut signed = 0;
        for (slot, signer) in signers.iter().enumerate() {
            if let Some(key) = key_source(signer) {
                self.signatures[slot] = key.sign(&bytes);
                signed += 1;
            }
        }
        debug!(signed, total = signers.len(), "partially signed transaction");
        Ok(signed)
    }

    /// Check every signature slot against its signer key.
    pub fn verify_signatures(&self) -> Result<(), SolError> {
        let bytes = self.message.serialize()?;
        let signers = self.message.signer_keys();
        if signers.len() != self.signatures.len() {
            return Err(SolError::SignatureCountMismatch {
                expected: signers.len(),
                actual: self.signatures.len(),
            });
        }
        for (signer, signature) in signers.iter().zip(&self.signatures) {
            if !signature.verify(signer, &bytes) {
                return Err(SolError::SignatureVerification(*signer));
            }
        }
        Ok(())
    }

    /// Assemble the wire bytes:
    /// `compact-u16 signature count ‖ signatures ‖ message`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SolError> {
        let expected = self.message.header.num_required_signatures as usize;
        if self.signatures.len() != expected {
            return Err(SolError::SignatureCountMismatch {
                expected,
                actual: self.signatures.len(),
            });
        }

        let message_bytes = self.message.serialize()?;
        let mut buf = Vec::with_capacity(3 + 64 * self.signatures.len() + message_bytes.len());
        encode_compact_u16(self.signatures.len() as u16, &mut buf);
        for signature in &self.signatures {
            buf.extend_from_slice(&signature.0);
        }
        buf.extend_from_slice(&message_bytes);
        Ok(buf)
    }

    /// Decode a wire transaction, sniffing the message version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = ByteReader::new(bytes);

        let num_signatures = reader.read_compact_u16()? as usize;
        if num_signatures * 64 > reader.remaining() {
            return Err(SolError::UnexpectedEnd("signatures"));
        }
        let mut signatures = Vec::with_capacity(num_signatures);
        for _ in 0..num_signatures {
            signatures.push(Signature(reader.read_array::<64>("signature")?));
        }

        let message = decode_message(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(SolError::TrailingBytes(reader.remaining()));
        }

        Ok(Transaction {
            signatures,
            message,
        })
    }

    pub fn to_base64(&self) -> Result<String, SolError> {
        Ok(BASE64.encode(self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SolError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| SolError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Fluent construction of an unsigned transaction from instructions.
#[derive(Default)]
pub struct TransactionBuilder {
    instructions: Vec<Box<dyn Instruction>>,
    recent_blockhash: Hash,
    fee_payer: Option<PublicKey>,
    address_tables: AddressTables,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instruction(mut self, instruction: impl Instruction + 'static) -> Self {
        self.instructions.push(Box::new(instruction));
        self
    }

    pub fn set_recent_blockhash(mut self, recent_blockhash: Hash) -> Self {
        self.recent_blockhash = recent_blockhash;
        self
    }

    /// If not set, the fee payer defaults to the first signer account of the
    /// first instruction.
    pub fn set_fee_payer(mut self, fee_payer: PublicKey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Supply lookup table contents; eligible accounts will be referenced
    /// through the tables, producing a versioned message.
    pub fn set_address_tables(mut self, tables: AddressTables) -> Self {
        self.address_tables = tables;
        self
    }

    pub fn build(self) -> Result<Transaction, SolError> {
        let refs: Vec<&dyn Instruction> =
            self.instructions.iter().map(AsRef::as_ref).collect();
        let message = compile_message(
            &refs,
            self.recent_blockhash,
            self.fee_payer,
            &self.address_tables,
        )?;
        Ok(Transaction::new_unsigned(message))
    }
}
