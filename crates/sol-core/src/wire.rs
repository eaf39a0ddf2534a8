//! Byte-exact wire encoding and decoding of messages.
//!
//! Legacy layout:
//!
//! ```text
//! header                  3 bytes
//! num_account_keys        compact-u16
//! account_keys            32 bytes each
//! recent_blockhash        32 bytes
//! num_instructions        compact-u16
//! per instruction:
//!   program_id_index      u8
//!   num_accounts          compact-u16
//!   account_indexes       u8 each
//!   data_len              compact-u16
//!   data                  u8 each
//! ```
//!
//! A versioned (v0) message prepends a single marker byte `127 + version`
//! (so `0x80` for v0) and appends a lookup section after the instructions:
//! one count byte, then per lookup a 32-byte table key and the
//! compact-u16-prefixed writable and readonly index byte lists. A v0 message
//! without lookups still writes the single zero count byte.
//!
//! Version detection peeks at the first byte: values below 127 are a legacy
//! header's `num_required_signatures`. This is a hard protocol constraint
//! inherited from the wire format — legacy signature counts never reach 127 —
//! not an assumption this layer can relax.

use crate::compact::{decode_compact_u16, encode_compact_u16};
use crate::error::SolError;
use crate::keys::{Hash, PublicKey};
use crate::message::{
    CompiledInstruction, Message, MessageAddressTableLookup, MessageHeader, MessageVersion,
};

/// First byte of a versioned message is this marker plus the version number.
const VERSION_MARKER_BASE: u8 = 127;

impl Message {
    /// Encode to wire bytes, legacy or v0 per `self.version`.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(self.wire_size_hint());

        if self.is_versioned() {
            buf.push(VERSION_MARKER_BASE + 1);
        }

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        encode_compact_u16(length_u16(self.account_keys.len())?, &mut buf);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(&self.recent_blockhash.0);

        encode_compact_u16(length_u16(self.instructions.len())?, &mut buf);
        for instruction in &self.instructions {
            buf.push(index_u8(instruction.program_id_index)?);
            encode_compact_u16(length_u16(instruction.accounts.len())?, &mut buf);
            for &account_index in &instruction.accounts {
                buf.push(index_u8(account_index)?);
            }
            encode_compact_u16(length_u16(instruction.data.len())?, &mut buf);
            buf.extend_from_slice(&instruction.data);
        }

        if self.is_versioned() {
            let count = self.address_table_lookups.len();
            if count > u8::MAX as usize {
                return Err(SolError::LengthOverflow(count));
            }
            buf.push(count as u8);
            for lookup in &self.address_table_lookups {
                buf.extend_from_slice(lookup.account_key.as_ref());
                encode_compact_u16(length_u16(lookup.writable_indexes.len())?, &mut buf);
                buf.extend_from_slice(&lookup.writable_indexes);
                encode_compact_u16(length_u16(lookup.readonly_indexes.len())?, &mut buf);
                buf.extend_from_slice(&lookup.readonly_indexes);
            }
        }

        Ok(buf)
    }

    /// Decode wire bytes, sniffing the version from the first byte.
    ///
    /// The input must contain exactly one message; trailing bytes are an
    /// error.
    pub fn deserialize(bytes: &[u8]) -> Result<Message, SolError> {
        let mut reader = ByteReader::new(bytes);
        let message = decode_message(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(SolError::TrailingBytes(reader.remaining()));
        }
        Ok(message)
    }

    fn wire_size_hint(&self) -> usize {
        1 + 3
            + 3
            + 32 * self.account_keys.len()
            + 32
            + self
                .instructions
                .iter()
                .map(|ix| 8 + ix.accounts.len() + ix.data.len())
                .sum::<usize>()
            + self
                .address_table_lookups
                .iter()
                .map(|l| 32 + 6 + l.index_count())
                .sum::<usize>()
    }
}

pub(crate) fn decode_message(reader: &mut ByteReader<'_>) -> Result<Message, SolError> {
    let first = reader.peek_u8("message header")?;
    let version = if first < VERSION_MARKER_BASE {
        MessageVersion::Legacy
    } else {
        reader.read_u8("message version")?;
        match first - VERSION_MARKER_BASE {
            1 => MessageVersion::V0,
            _ => return Err(SolError::UnsupportedVersion(first)),
        }
    };

    let header = MessageHeader {
        num_required_signatures: reader.read_u8("header")?,
        num_readonly_signed_accounts: reader.read_u8("header")?,
        num_readonly_unsigned_accounts: reader.read_u8("header")?,
    };

    let num_keys = reader.read_compact_u16()? as usize;
    let mut account_keys = Vec::with_capacity(num_keys);
    for _ in 0..num_keys {
        account_keys.push(PublicKey(reader.read_array::<32>("account key")?));
    }

    let recent_blockhash = Hash(reader.read_array::<32>("recent blockhash")?);

    let num_instructions = reader.read_compact_u16()? as usize;
    let mut instructions = Vec::with_capacity(num_instructions);
    for _ in 0..num_instructions {
        let program_id_index = reader.read_u8("program id index")? as u16;
        let num_accounts = reader.read_compact_u16()? as usize;
        let mut accounts = Vec::with_capacity(num_accounts);
        for _ in 0..num_accounts {
            accounts.push(reader.read_u8("instruction account index")? as u16);
        }
        let data_len = reader.read_compact_u16()? as usize;
        let data = reader.read_bytes(data_len, "instruction data")?.to_vec();
        instructions.push(CompiledInstruction {
            program_id_index,
            accounts,
            data,
        });
    }

    let mut address_table_lookups = Vec::new();
    if version == MessageVersion::V0 {
        let num_lookups = reader.read_u8("lookup count")? as usize;
        address_table_lookups.reserve(num_lookups);
        for _ in 0..num_lookups {
            let account_key = PublicKey(reader.read_array::<32>("lookup table key")?);
            let writable_len = reader.read_compact_u16()? as usize;
            let writable_indexes = reader.read_bytes(writable_len, "writable indexes")?.to_vec();
            let readonly_len = reader.read_compact_u16()? as usize;
            let readonly_indexes = reader.read_bytes(readonly_len, "readonly indexes")?.to_vec();
            address_table_lookups.push(MessageAddressTableLookup {
                account_key,
                writable_indexes,
                readonly_indexes,
            });
        }
    }

    Ok(Message {
        version,
        account_keys,
        header,
        recent_blockhash,
        instructions,
        address_table_lookups,
    })
}

fn length_u16(len: usize) -> Result<u16, SolError> {
    u16::try_from(len).map_err(|_| SolError::LengthOverflow(len))
}

fn index_u8(index: u16) -> Result<u8, SolError> {
    u8::try_from(index).map_err(|_| SolError::AccountIndexOverflow(index))
}

/// Forward-only cursor over a byte slice.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn peek_u8(&self, context: &'static str) -> Result<u8, SolError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(SolError::UnexpectedEnd(context))
    }

    pub(crate) fn read_u8(&mut self, context: &'static str) -> Result<u8, SolError> {
        let byte = self.peek_u8(context)?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_bytes(
        &mut self,
        len: usize,
        context: &'static str,
    ) -> Result<&'a [u8], SolError> {
        if self.remaining() < len {
            return Err(SolError::UnexpectedEnd(context));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_array<const N: usize>(
        &mut self,
        context: &'static str,
    ) -> Result<[u8; N], SolError> {
        let slice = self.read_bytes(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn read_compact_u16(&mut self) -> Result<u16, SolError> {
        let (value, consumed) = decode_compact_u16(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }
}
