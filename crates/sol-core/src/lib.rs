//! Client-side transaction compilation, wire codec, and signing for the
//! Solana network.
//!
//! This crate implements the transaction wire format by hand — no
//! `solana-sdk` dependency (which drags in tokio and 200+ transitive
//! dependencies). It covers the full build path:
//!
//! instructions -> compiled [`Message`] -> wire bytes -> signatures ->
//! [`Transaction`]
//!
//! and its mirror: wire bytes -> version-sniffed message -> (for versioned
//! messages) address-table resolution -> role queries. Everything here is
//! pure and synchronous; fetching blockhashes, lookup tables, and key
//! material is the caller's concern.

pub mod compact;
pub mod compile;
pub mod error;
pub mod instruction;
pub mod keys;
pub mod message;
pub mod pda;
pub mod registry;
pub mod transaction;

mod wire;

// Re-export key public types for ergonomic imports.
pub use compact::{decode_compact_u16, encode_compact_u16};
pub use compile::compile_message;
pub use error::SolError;
pub use instruction::{AccountMeta, Instruction, RawInstruction};
pub use keys::{Hash, PrivateKey, PublicKey, Signature};
pub use message::{
    AddressTables, CompiledInstruction, Message, MessageAddressTableLookup, MessageHeader,
    MessageVersion, ResolvedMessage,
};
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use registry::{DecodeFn, InstructionDecoderRegistry};
pub use transaction::{sign_message, Transaction, TransactionBuilder};
