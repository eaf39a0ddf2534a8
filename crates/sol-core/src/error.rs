use thiserror::Error;

use crate::keys::PublicKey;

/// Errors produced while compiling, encoding, resolving, or signing
/// transactions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolError {
    // -- compilation --------------------------------------------------------
    #[error("requires at least one instruction to create a transaction")]
    EmptyInstructionList,

    #[error("cannot determine fee payer: pass one explicitly or make the first account of the first instruction a signer")]
    FeePayerUnknown,

    #[error("unable to encode instruction [{index}]: {reason}")]
    InstructionData { index: usize, reason: String },

    #[error("address table {0} holds more than 256 addresses")]
    AddressTableTooLarge(PublicKey),

    // -- wire encoding / decoding -------------------------------------------
    #[error("unsupported message version marker {0}")]
    UnsupportedVersion(u8),

    #[error("malformed compact-u16 encoding")]
    MalformedCompactU16,

    #[error("unexpected end of data while decoding {0}")]
    UnexpectedEnd(&'static str),

    #[error("account index {0} does not fit in a single byte")]
    AccountIndexOverflow(u16),

    #[error("length {0} exceeds the wire format limit")]
    LengthOverflow(usize),

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    // -- address-table lookup resolution -------------------------------------
    #[error("lookup table {0} not found in the supplied address tables")]
    LookupTableNotFound(PublicKey),

    #[error("lookup index {index} out of range for table {table} of length {len}")]
    LookupIndexOutOfRange {
        table: PublicKey,
        index: u8,
        len: usize,
    },

    #[error("message has unresolved address table lookups")]
    UnresolvedLookups,

    // -- signing -------------------------------------------------------------
    #[error("signer key {0} not found in the key source")]
    MissingSignerKey(PublicKey),

    #[error("transaction has {actual} signatures but the message requires {expected}")]
    SignatureCountMismatch { expected: usize, actual: usize },

    #[error("invalid signature by {0}")]
    SignatureVerification(PublicKey),

    // -- instruction decoder registry ----------------------------------------
    #[error("instruction decoder already registered for program {0}")]
    DuplicateDecoderRegistration(PublicKey),

    #[error("instruction decoder not found for program {0}")]
    DecoderNotFound(PublicKey),

    #[error("unknown instruction tag {0}")]
    UnknownInstructionTag(u32),

    // -- primitives -----------------------------------------------------------
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignatureText(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base64 transaction: {0}")]
    InvalidBase64(String),

    #[error("program id index {0} not found in account keys")]
    ProgramIdIndexOutOfRange(u16),

    #[error("instruction account index {0} out of range")]
    InstructionAccountOutOfRange(u16),

    #[error("account {0} not found in account keys")]
    AccountNotFound(PublicKey),

    #[error("could not find a valid program address bump seed")]
    NoProgramAddressFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty_instruction_list() {
        assert_eq!(
            SolError::EmptyInstructionList.to_string(),
            "requires at least one instruction to create a transaction"
        );
    }

    #[test]
    fn display_lookup_index_out_of_range() {
        let err = SolError::LookupIndexOutOfRange {
            table: PublicKey::default(),
            index: 7,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "lookup index 7 out of range for table 11111111111111111111111111111111 of length 4"
        );
    }

    #[test]
    fn display_signature_count_mismatch() {
        let err = SolError::SignatureCountMismatch {
            expected: 2,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "transaction has 0 signatures but the message requires 2"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SolError::MalformedCompactU16);
        assert!(err.to_string().contains("compact-u16"));
    }
}
