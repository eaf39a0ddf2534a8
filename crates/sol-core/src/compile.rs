//! The transaction compiler: turns a list of instructions into a message
//! with a canonically ordered account table and a derived header.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::SolError;
use crate::instruction::{AccountMeta, Instruction};
use crate::keys::{Hash, PublicKey};
use crate::message::{
    AddressTables, CompiledInstruction, Message, MessageAddressTableLookup, MessageHeader,
    MessageVersion,
};

/// Compile `instructions` into a [`Message`] embedding `recent_blockhash`.
///
/// The fee payer lands at index 0 as a writable signer: the explicit
/// `fee_payer` if given (the zero key counts as unset), otherwise the first
/// signer account of the first instruction. If the fee payer is not
/// referenced by any instruction it is inserted rather than left out.
///
/// Account ordering is a stable sort — signers before non-signers, writable
/// before read-only within each group — with first-occurrence deduplication;
/// a duplicated key keeps its earliest position and unions its access flags
/// across all occurrences.
///
/// When `address_tables` is non-empty, non-signer accounts found in a table
/// (other than the fee payer and invoked program ids) are referenced through
/// address table lookups instead of the static key list, and the message
/// becomes versioned. Compiled instruction indexes then count the static keys
/// first, followed by each lookup's writable and readonly entries in lookup
/// order — the same order lookup resolution appends them.
pub fn compile_message(
    instructions: &[&dyn Instruction],
    recent_blockhash: Hash,
    fee_payer: Option<PublicKey>,
    address_tables: &AddressTables,
) -> Result<Message, SolError> {
    if instructions.is_empty() {
        return Err(SolError::EmptyInstructionList);
    }

    let fee_payer = match fee_payer {
        Some(key) if !key.is_zero() => key,
        _ => instructions[0]
            .accounts()
            .iter()
            .find(|meta| meta.is_signer)
            .map(|meta| meta.pubkey)
            .ok_or(SolError::FeePayerUnknown)?,
    };

    // Reverse map: address -> (table key, index within that table). The first
    // table containing an address wins.
    let mut table_entries: HashMap<PublicKey, (PublicKey, u8)> = HashMap::new();
    for (table_key, addresses) in address_tables {
        if addresses.len() > 256 {
            return Err(SolError::AddressTableTooLarge(*table_key));
        }
        for (index, address) in addresses.iter().enumerate() {
            table_entries
                .entry(*address)
                .or_insert((*table_key, index as u8));
        }
    }

    // Collect one meta per (instruction, account) pair plus one read-only
    // non-signer meta per distinct program id, first-seen order.
    let mut metas: Vec<AccountMeta> = Vec::new();
    let mut program_ids: Vec<PublicKey> = Vec::new();
    for instruction in instructions {
        metas.extend(instruction.accounts());
        let program_id = instruction.program_id();
        if !program_ids.contains(&program_id) {
            program_ids.push(program_id);
        }
    }
    for program_id in &program_ids {
        metas.push(AccountMeta::new_readonly(*program_id, false));
    }

    // Stable two-key ordering: signers first, then writable within each
    // group. After this sort, the first occurrence of a key that signs
    // anywhere is a signer occurrence.
    metas.sort_by_key(|meta| (!meta.is_signer, !meta.is_writable));

    let mut unique: Vec<AccountMeta> = Vec::with_capacity(metas.len());
    let mut first_occurrence: HashMap<PublicKey, usize> = HashMap::new();
    for meta in metas {
        match first_occurrence.get(&meta.pubkey) {
            Some(&at) => {
                unique[at].is_signer |= meta.is_signer;
                unique[at].is_writable |= meta.is_writable;
            }
            None => {
                first_occurrence.insert(meta.pubkey, unique.len());
                unique.push(meta);
            }
        }
    }

    // The fee payer always leads as a writable signer, whether it was
    // referenced or not; everyone else keeps their relative order.
    let mut ordered: Vec<AccountMeta> = Vec::with_capacity(unique.len() + 1);
    ordered.push(AccountMeta::new(fee_payer, true));
    ordered.extend(unique.into_iter().filter(|meta| meta.pubkey != fee_payer));

    debug!(
        account_count = ordered.len(),
        fee_payer = %fee_payer,
        "compiling message"
    );

    // Route each account into the static key list or a table lookup. Only
    // non-signer, non-program accounts other than the fee payer may be
    // loaded through a table.
    let invoked: HashSet<PublicKey> = program_ids.iter().copied().collect();
    let mut static_keys: Vec<PublicKey> = Vec::with_capacity(ordered.len());
    let mut header = MessageHeader::default();
    let mut drafts: Vec<(PublicKey, LookupDraft)> = Vec::new();

    for (position, meta) in ordered.iter().enumerate() {
        if position != 0 && !meta.is_signer && !invoked.contains(&meta.pubkey) {
            if let Some(&(table_key, entry_index)) = table_entries.get(&meta.pubkey) {
                let found = drafts.iter().position(|(key, _)| *key == table_key);
                let at = match found {
                    Some(at) => at,
                    None => {
                        drafts.push((table_key, LookupDraft::default()));
                        drafts.len() - 1
                    }
                };
                let draft = &mut drafts[at].1;
                if meta.is_writable {
                    draft.writable_indexes.push(entry_index);
                    draft.writable.push(meta.pubkey);
                } else {
                    draft.readonly_indexes.push(entry_index);
                    draft.readonly.push(meta.pubkey);
                }
                continue;
            }
        }

        static_keys.push(meta.pubkey);
        if meta.is_signer {
            header.num_required_signatures += 1;
            if !meta.is_writable {
                header.num_readonly_signed_accounts += 1;
            }
        } else if !meta.is_writable {
            header.num_readonly_unsigned_accounts += 1;
        }
    }

    // Indexes cover the static keys first, then each lookup's writable and
    // readonly entries, matching the post-resolution account list.
    let mut index_of: HashMap<PublicKey, u16> = HashMap::with_capacity(ordered.len());
    for key in &static_keys {
        let next = index_of.len() as u16;
        index_of.insert(*key, next);
    }
    let mut lookups: Vec<MessageAddressTableLookup> = Vec::with_capacity(drafts.len());
    for (table_key, draft) in drafts {
        for key in draft.writable.iter().chain(draft.readonly.iter()) {
            let next = index_of.len() as u16;
            index_of.insert(*key, next);
        }
        lookups.push(MessageAddressTableLookup {
            account_key: table_key,
            writable_indexes: draft.writable_indexes,
            readonly_indexes: draft.readonly_indexes,
        });
    }

    let mut compiled: Vec<CompiledInstruction> = Vec::with_capacity(instructions.len());
    for (index, instruction) in instructions.iter().enumerate() {
        let data = instruction
            .data()
            .map_err(|e| SolError::InstructionData {
                index,
                reason: e.to_string(),
            })?;
        let program_id = instruction.program_id();
        let program_id_index = lookup_index(&index_of, &program_id)?;
        let accounts = instruction
            .accounts()
            .iter()
            .map(|meta| lookup_index(&index_of, &meta.pubkey))
            .collect::<Result<Vec<u16>, SolError>>()?;
        compiled.push(CompiledInstruction {
            program_id_index,
            accounts,
            data,
        });
    }

    let mut message = Message {
        version: MessageVersion::Legacy,
        account_keys: static_keys,
        header,
        recent_blockhash,
        instructions: compiled,
        address_table_lookups: Vec::new(),
    };
    message.set_address_table_lookups(lookups);

    Ok(message)
}

#[derive(Default)]
struct LookupDraft {
    writable_indexes: Vec<u8>,
    writable: Vec<PublicKey>,
    readonly_indexes: Vec<u8>,
    readonly: Vec<PublicKey>,
}

fn lookup_index(
    index_of: &HashMap<PublicKey, u16>,
    key: &PublicKey,
) -> Result<u16, SolError> {
    index_of
        .get(key)
        .copied()
        .ok_or(SolError::AccountNotFound(*key))
}
