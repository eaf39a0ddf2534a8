//! The transaction message model: the canonical account table, header,
//! compiled instructions, and (for versioned messages) address table lookups.
//!
//! A `Message` always carries exactly its *static* account keys — the ones
//! embedded in the wire encoding. Addresses referenced through lookup tables
//! only exist once the message is resolved against the table contents, which
//! produces a separate [`ResolvedMessage`] value; the original message is
//! never mutated. Role queries on a message that still has unresolved
//! lookups fail with [`SolError::UnresolvedLookups`] rather than answering
//! from an incomplete account list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SolError;
use crate::instruction::AccountMeta;
use crate::keys::{Hash, PublicKey};

/// Lookup table contents keyed by table address, as fetched by the caller.
pub type AddressTables = BTreeMap<PublicKey, Vec<PublicKey>>;

/// Wire format revision of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageVersion {
    #[default]
    Legacy,
    V0,
}

/// Signature and access-mode counts over the ordered account keys.
///
/// The first `num_required_signatures` keys are the signers; the last
/// `num_readonly_signed_accounts` of those are read-only. Of the remaining
/// (non-signer) keys, the last `num_readonly_unsigned_accounts` are
/// read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its account references rewritten as indexes into the
/// message's account keys.
///
/// Indexes are stored as `u16` for arithmetic convenience but the wire format
/// caps them at one byte each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    pub program_id_index: u16,
    pub accounts: Vec<u16>,
    #[serde(with = "data_base58")]
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    /// Map this instruction's account indexes back to metas, given the
    /// message's complete meta list (see [`Message::account_meta_list`] /
    /// [`ResolvedMessage::account_meta_list`]).
    pub fn resolve_accounts(&self, metas: &[AccountMeta]) -> Result<Vec<AccountMeta>, SolError> {
        self.accounts
            .iter()
            .map(|&index| {
                metas
                    .get(index as usize)
                    .copied()
                    .ok_or(SolError::InstructionAccountOutOfRange(index))
            })
            .collect()
    }
}

/// A reference into an on-chain address lookup table: which table, and which
/// of its entries are loaded writable or read-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAddressTableLookup {
    pub account_key: PublicKey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

impl MessageAddressTableLookup {
    /// Total number of addresses this lookup loads.
    pub fn index_count(&self) -> usize {
        self.writable_indexes.len() + self.readonly_indexes.len()
    }
}

/// The content of a transaction: everything that gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub version: MessageVersion,

    /// The static account keys, in canonical order. The first
    /// `header.num_required_signatures` of them must sign the transaction.
    pub account_keys: Vec<PublicKey>,

    pub header: MessageHeader,

    /// A recent ledger hash, embedded verbatim.
    pub recent_blockhash: Hash,

    /// Instructions executed in sequence, committed atomically.
    pub instructions: Vec<CompiledInstruction>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address_table_lookups: Vec<MessageAddressTableLookup>,
}

impl Message {
    /// Attach address table lookups. Any lookup makes the message versioned.
    pub fn set_address_table_lookups(&mut self, lookups: Vec<MessageAddressTableLookup>) {
        if !lookups.is_empty() {
            self.version = MessageVersion::V0;
        }
        self.address_table_lookups = lookups;
    }

    pub fn is_versioned(&self) -> bool {
        self.version != MessageVersion::Legacy
    }

    /// Total number of addresses loaded through lookup tables.
    pub fn total_lookup_index_count(&self) -> usize {
        self.address_table_lookups
            .iter()
            .map(MessageAddressTableLookup::index_count)
            .sum()
    }

    /// The signer keys, in signing order. Signers are always static keys
    /// (table-loaded accounts can never sign), so this is valid even before
    /// lookup resolution.
    pub fn signer_keys(&self) -> &[PublicKey] {
        let n = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    /// Expand the lookup tables into a [`ResolvedMessage`].
    ///
    /// For each lookup, in order, the writable entries are appended first and
    /// the read-only entries after them. The transform is pure: resolving the
    /// same message twice yields identical values and never duplicates keys.
    pub fn resolve(&self, tables: &AddressTables) -> Result<ResolvedMessage, SolError> {
        let mut loaded = Vec::with_capacity(self.total_lookup_index_count());
        for lookup in &self.address_table_lookups {
            let table = tables
                .get(&lookup.account_key)
                .ok_or(SolError::LookupTableNotFound(lookup.account_key))?;
            for &index in &lookup.writable_indexes {
                loaded.push(AccountMeta::new(
                    table_entry(table, &lookup.account_key, index)?,
                    false,
                ));
            }
            for &index in &lookup.readonly_indexes {
                loaded.push(AccountMeta::new_readonly(
                    table_entry(table, &lookup.account_key, index)?,
                    false,
                ));
            }
        }

        tracing::debug!(
            static_keys = self.account_keys.len(),
            loaded = loaded.len(),
            "resolved address table lookups"
        );

        Ok(ResolvedMessage {
            message: self.clone(),
            loaded,
        })
    }

    // -- role queries --------------------------------------------------------
    //
    // These answer over the complete account list and therefore refuse to run
    // while lookups are unresolved.

    pub fn is_signer(&self, account: &PublicKey) -> Result<bool, SolError> {
        self.view()
            .map(|v| v.is_signer(account))
    }

    pub fn is_writable(&self, account: &PublicKey) -> Result<bool, SolError> {
        self.view().map(|v| v.is_writable(account))
    }

    pub fn has_account(&self, account: &PublicKey) -> Result<bool, SolError> {
        self.view().map(|v| v.position(account).is_some())
    }

    pub fn get_account_index(&self, account: &PublicKey) -> Result<u16, SolError> {
        self.view()?.index_of(account)
    }

    /// One `AccountMeta` per account key, in order.
    pub fn account_meta_list(&self) -> Result<Vec<AccountMeta>, SolError> {
        self.view().map(|v| v.meta_list())
    }

    /// The pubkeys of all signer accounts.
    pub fn signers(&self) -> Result<Vec<PublicKey>, SolError> {
        self.view().map(|v| v.signers())
    }

    /// The pubkeys of all writable accounts.
    pub fn writable(&self) -> Result<Vec<PublicKey>, SolError> {
        self.view().map(|v| v.writable())
    }

    pub fn resolve_program_id_index(&self, index: u16) -> Result<PublicKey, SolError> {
        self.view()?.key_at(index)
    }

    fn view(&self) -> Result<RoleView<'_>, SolError> {
        if !self.address_table_lookups.is_empty() {
            return Err(SolError::UnresolvedLookups);
        }
        Ok(RoleView {
            header: &self.header,
            statics: &self.account_keys,
            loaded: &[],
        })
    }
}

fn table_entry(
    table: &[PublicKey],
    table_key: &PublicKey,
    index: u8,
) -> Result<PublicKey, SolError> {
    table
        .get(index as usize)
        .copied()
        .ok_or(SolError::LookupIndexOutOfRange {
            table: *table_key,
            index,
            len: table.len(),
        })
}

/// A message whose address table lookups have been expanded against the
/// supplied table contents. All role queries are valid here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    message: Message,
    loaded: Vec<AccountMeta>,
}

impl ResolvedMessage {
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The accounts loaded through lookup tables, in append order.
    pub fn loaded_addresses(&self) -> &[AccountMeta] {
        &self.loaded
    }

    /// The complete account list: static keys followed by loaded addresses.
    pub fn account_keys(&self) -> Vec<PublicKey> {
        let mut keys = self.message.account_keys.clone();
        keys.extend(self.loaded.iter().map(|meta| meta.pubkey));
        keys
    }

    pub fn is_signer(&self, account: &PublicKey) -> bool {
        self.view().is_signer(account)
    }

    pub fn is_writable(&self, account: &PublicKey) -> bool {
        self.view().is_writable(account)
    }

    pub fn has_account(&self, account: &PublicKey) -> bool {
        self.view().position(account).is_some()
    }

    pub fn get_account_index(&self, account: &PublicKey) -> Result<u16, SolError> {
        self.view().index_of(account)
    }

    pub fn account_meta_list(&self) -> Vec<AccountMeta> {
        self.view().meta_list()
    }

    pub fn signers(&self) -> Vec<PublicKey> {
        self.view().signers()
    }

    pub fn writable(&self) -> Vec<PublicKey> {
        self.view().writable()
    }

    pub fn resolve_program_id_index(&self, index: u16) -> Result<PublicKey, SolError> {
        self.view().key_at(index)
    }

    fn view(&self) -> RoleView<'_> {
        RoleView {
            header: &self.message.header,
            statics: &self.message.account_keys,
            loaded: &self.loaded,
        }
    }
}

/// Position-based role logic shared by `Message` and `ResolvedMessage`.
struct RoleView<'a> {
    header: &'a MessageHeader,
    statics: &'a [PublicKey],
    loaded: &'a [AccountMeta],
}

impl RoleView<'_> {
    fn len(&self) -> usize {
        self.statics.len() + self.loaded.len()
    }

    fn key_at(&self, index: u16) -> Result<PublicKey, SolError> {
        let i = index as usize;
        if i < self.statics.len() {
            Ok(self.statics[i])
        } else {
            self.loaded
                .get(i - self.statics.len())
                .map(|meta| meta.pubkey)
                .ok_or(SolError::ProgramIdIndexOutOfRange(index))
        }
    }

    fn is_signer_at(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    fn is_writable_at(&self, index: usize) -> bool {
        if index < self.statics.len() {
            let h = self.header;
            let num_signed = h.num_required_signatures as usize;
            let writable_signed = num_signed - (h.num_readonly_signed_accounts as usize).min(num_signed);
            let writable_unsigned_end =
                self.statics.len() - (h.num_readonly_unsigned_accounts as usize).min(self.statics.len());
            index < writable_signed || (index >= num_signed && index < writable_unsigned_end)
        } else {
            self.loaded[index - self.statics.len()].is_writable
        }
    }

    fn position(&self, account: &PublicKey) -> Option<usize> {
        (0..self.len()).find(|&i| self.key_unchecked(i) == *account)
    }

    fn key_unchecked(&self, index: usize) -> PublicKey {
        if index < self.statics.len() {
            self.statics[index]
        } else {
            self.loaded[index - self.statics.len()].pubkey
        }
    }

    fn is_signer(&self, account: &PublicKey) -> bool {
        self.position(account)
            .is_some_and(|i| self.is_signer_at(i))
    }

    fn is_writable(&self, account: &PublicKey) -> bool {
        (0..self.len())
            .any(|i| self.key_unchecked(i) == *account && self.is_writable_at(i))
    }

    fn index_of(&self, account: &PublicKey) -> Result<u16, SolError> {
        self.position(account)
            .map(|i| i as u16)
            .ok_or(SolError::AccountNotFound(*account))
    }

    fn meta_list(&self) -> Vec<AccountMeta> {
        (0..self.len())
            .map(|i| AccountMeta {
                pubkey: self.key_unchecked(i),
                is_signer: self.is_signer_at(i),
                is_writable: self.is_writable_at(i),
            })
            .collect()
    }

    fn signers(&self) -> Vec<PublicKey> {
        (0..self.len())
            .filter(|&i| self.is_signer_at(i))
            .map(|i| self.key_unchecked(i))
            .collect()
    }

    fn writable(&self) -> Vec<PublicKey> {
        (0..self.len())
            .filter(|&i| self.is_writable_at(i))
            .map(|i| self.key_unchecked(i))
            .collect()
    }
}

mod data_base58 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&bs58::encode(data).into_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        bs58::decode(s).into_vec().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(n: u8) -> PublicKey {
        PublicKey::new([n; 32])
    }

    /// 4 accounts: writable signer, read-only signer, writable non-signer,
    /// read-only non-signer.
    fn legacy_message() -> Message {
        Message {
            version: MessageVersion::Legacy,
            account_keys: vec![pk(1), pk(2), pk(3), pk(4)],
            header: MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed_accounts: 1,
                num_readonly_unsigned_accounts: 1,
            },
            recent_blockhash: Hash::new([0xaa; 32]),
            instructions: vec![CompiledInstruction {
                program_id_index: 3,
                accounts: vec![0, 2],
                data: vec![1, 2, 3],
            }],
            address_table_lookups: vec![],
        }
    }

    fn v0_message() -> Message {
        let mut message = legacy_message();
        message.set_address_table_lookups(vec![MessageAddressTableLookup {
            account_key: pk(9),
            writable_indexes: vec![1, 2],
            readonly_indexes: vec![0],
        }]);
        message
    }

    fn tables() -> AddressTables {
        let mut tables = AddressTables::new();
        tables.insert(pk(9), vec![pk(10), pk(11), pk(12), pk(13)]);
        tables
    }

    #[test]
    fn legacy_role_queries() {
        let m = legacy_message();
        assert!(m.is_signer(&pk(1)).unwrap());
        assert!(m.is_signer(&pk(2)).unwrap());
        assert!(!m.is_signer(&pk(3)).unwrap());

        assert!(m.is_writable(&pk(1)).unwrap());
        assert!(!m.is_writable(&pk(2)).unwrap());
        assert!(m.is_writable(&pk(3)).unwrap());
        assert!(!m.is_writable(&pk(4)).unwrap());
    }

    #[test]
    fn legacy_meta_list_matches_header_partitions() {
        let metas = legacy_message().account_meta_list().unwrap();
        let flags: Vec<(bool, bool)> = metas
            .iter()
            .map(|m| (m.is_signer, m.is_writable))
            .collect();
        assert_eq!(
            flags,
            vec![(true, true), (true, false), (false, true), (false, false)]
        );
    }

    #[test]
    fn legacy_signers_and_writable() {
        let m = legacy_message();
        assert_eq!(m.signers().unwrap(), vec![pk(1), pk(2)]);
        assert_eq!(m.writable().unwrap(), vec![pk(1), pk(3)]);
    }

    #[test]
    fn program_id_index_resolution() {
        let m = legacy_message();
        assert_eq!(m.resolve_program_id_index(3).unwrap(), pk(4));
        assert_eq!(
            m.resolve_program_id_index(7),
            Err(SolError::ProgramIdIndexOutOfRange(7))
        );
    }

    #[test]
    fn unknown_account_queries() {
        let m = legacy_message();
        assert!(!m.is_signer(&pk(99)).unwrap());
        assert!(!m.is_writable(&pk(99)).unwrap());
        assert!(!m.has_account(&pk(99)).unwrap());
        assert_eq!(
            m.get_account_index(&pk(99)),
            Err(SolError::AccountNotFound(pk(99)))
        );
    }

    #[test]
    fn lookups_force_versioned() {
        let m = v0_message();
        assert!(m.is_versioned());
        assert_eq!(m.version, MessageVersion::V0);
        assert_eq!(m.total_lookup_index_count(), 3);
    }

    #[test]
    fn role_queries_fail_before_resolution() {
        let m = v0_message();
        assert_eq!(m.is_signer(&pk(1)), Err(SolError::UnresolvedLookups));
        assert_eq!(m.is_writable(&pk(1)), Err(SolError::UnresolvedLookups));
        assert_eq!(m.signers(), Err(SolError::UnresolvedLookups));
        assert_eq!(m.writable(), Err(SolError::UnresolvedLookups));
        assert_eq!(m.account_meta_list(), Err(SolError::UnresolvedLookups));
        assert_eq!(
            m.resolve_program_id_index(0),
            Err(SolError::UnresolvedLookups)
        );
    }

    #[test]
    fn signer_keys_valid_even_with_unresolved_lookups() {
        let m = v0_message();
        assert_eq!(m.signer_keys(), &[pk(1), pk(2)]);
    }

    #[test]
    fn resolve_appends_writable_then_readonly() {
        let resolved = v0_message().resolve(&tables()).unwrap();
        assert_eq!(
            resolved.account_keys(),
            vec![pk(1), pk(2), pk(3), pk(4), pk(11), pk(12), pk(10)]
        );

        // Loaded accounts carry their access mode and never sign.
        assert!(resolved.is_writable(&pk(11)));
        assert!(resolved.is_writable(&pk(12)));
        assert!(!resolved.is_writable(&pk(10)));
        assert!(!resolved.is_signer(&pk(11)));
        assert!(!resolved.is_signer(&pk(10)));
    }

    #[test]
    fn resolve_is_idempotent() {
        let m = v0_message();
        let once = m.resolve(&tables()).unwrap();
        let twice = m.resolve(&tables()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            once.account_keys().len(),
            m.account_keys.len() + m.total_lookup_index_count()
        );
    }

    #[test]
    fn resolve_missing_table_fails() {
        let mut m = v0_message();
        m.address_table_lookups[0].account_key = pk(77);
        assert_eq!(
            m.resolve(&tables()),
            Err(SolError::LookupTableNotFound(pk(77)))
        );
    }

    #[test]
    fn resolve_out_of_range_index_fails() {
        let mut m = v0_message();
        m.address_table_lookups[0].readonly_indexes = vec![200];
        assert_eq!(
            m.resolve(&tables()),
            Err(SolError::LookupIndexOutOfRange {
                table: pk(9),
                index: 200,
                len: 4,
            })
        );
    }

    #[test]
    fn resolved_program_id_index_covers_loaded_addresses() {
        let resolved = v0_message().resolve(&tables()).unwrap();
        assert_eq!(resolved.resolve_program_id_index(4).unwrap(), pk(11));
        assert_eq!(resolved.resolve_program_id_index(6).unwrap(), pk(10));
        assert!(resolved.resolve_program_id_index(7).is_err());
    }

    #[test]
    fn resolved_account_index_lookup() {
        let resolved = v0_message().resolve(&tables()).unwrap();
        assert_eq!(resolved.get_account_index(&pk(12)).unwrap(), 5);
    }

    #[test]
    fn message_json_uses_camel_case_and_base58_data() {
        let json = serde_json::to_value(legacy_message()).unwrap();
        assert!(json.get("accountKeys").is_some());
        assert!(json.get("recentBlockhash").is_some());
        assert_eq!(json["header"]["numRequiredSignatures"], 2);
        assert_eq!(json["instructions"][0]["programIdIndex"], 3);
        // [1, 2, 3] encodes to "Ldp" in Base58.
        assert_eq!(json["instructions"][0]["data"], "Ldp");
        // Lookup section absent for legacy messages.
        assert!(json.get("addressTableLookups").is_none());
    }

    #[test]
    fn message_json_roundtrip() {
        for message in [legacy_message(), v0_message()] {
            let json = serde_json::to_string(&message).unwrap();
            let back: Message = serde_json::from_str(&json).unwrap();
            assert_eq!(back, message);
        }
    }
}
