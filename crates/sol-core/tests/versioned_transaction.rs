//! Versioned (v0) transaction fixture: decode, byte-exact re-encode, and
//! address table resolution.

use sol_core::{
    AddressTables, MessageAddressTableLookup, MessageVersion, PublicKey, SolError, Transaction,
};

const FIXTURE_B64: &str = "Alkhq/BfGdBeok4oBP21xAwT4oO/R5PvkKqbCTq4sHHRsto+uDQCFcdp8hXh1g5D3mTh8GAJW8xE+EDD27f9IweTkH2Afiu4h5aM+Xbo0mklc0/Vi1xawd7SZVbstXDLtWdoJaf4Zt+20F/SasURzw/P4dkD+Q6BjgUNHT+vg5gOgAIBAQgaJV0Ch/DG6XwNcizWbI7STLgSbIOrg0Dl67Oo30WU1uA/NIbYLPRmuLarIJ4J0CcN3IWEm4Gf8675KhnXef2LaDXzjFgWVSbAO2yyTF6dK1oO3gTExie957LXDwu6oJMAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAVKU1qZKSEGTSTocWDaOHx8NbXdvJK7geQfqEBBBUSN1LfoiB9oYLDSHJL9rjAlchZhn+fd/23ACfq0oIGla54pt5JT0MdBTJhQI+z7dnVsisw2xWwW+vFSTs97l0tJPxmv9kxpXbHYZFenDpT2s6CT75/9QNFVTkHFLMK+UG6VlyFnQmYh1aMkGtq3c6TIOsk32S6XMUnN9DQgFGQq4lwEAwIAAgwCAAAAgJaYAAAAAAADAgAFDAIAAACAlpgAAAAAAAMCAAYMAgAAAICWmAAAAAAABAAMSGVsbG8gRmFiaW8hAX5s37FH6IeB4QeMYxD4LtpXf1DaupH/ro7W+kEQnofaAgECAQA=";

fn key(s: &str) -> PublicKey {
    s.parse().unwrap()
}

fn table_key() -> PublicKey {
    key("9WWfC3y4uCNofr2qEFHSVUXkCxW99JiYkMWmSZvVt8j3")
}

fn tables() -> AddressTables {
    let mut tables = AddressTables::new();
    tables.insert(
        table_key(),
        vec![
            key("2jGpE3ADYRoJPMjyGC4tvqqDfobvdvwGr3vhd66zA1rc"),
            key("FKN5imdi7yadX4axe4hxaqBET4n6DBDRF5LKo5aBF53j"),
            key("3or4uF7ZyuQW5GGmcmdXDJasNiSZUURF2az1UrRPYQTg"),
            key("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"),
        ],
    );
    tables
}

fn static_keys() -> Vec<PublicKey> {
    vec![
        key("2m4eNwBVqu6SgFk23HgE3W5MW89yT5z1vspz2WsiFBHF"),
        key("G6NDx85GM481GPjT5kUBAvjLxzDMsgRMQ1EAxzGswEJn"),
        key("81o7hHYN5a8fc5wdjjfznK9ziJ9wcuKXwbZnuYpanxMQ"),
        key("11111111111111111111111111111111"),
        key("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"),
        key("FKN5imdi7yadX4axe4hxaqBET4n6DBDRF5LKo5aBF53j"),
        key("3or4uF7ZyuQW5GGmcmdXDJasNiSZUURF2az1UrRPYQTg"),
        key("2jGpE3ADYRoJPMjyGC4tvqqDfobvdvwGr3vhd66zA1rc"),
    ]
}

#[test]
fn decodes_the_versioned_fixture() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();

    assert!(tx.message.is_versioned());
    assert_eq!(tx.message.version, MessageVersion::V0);

    assert_eq!(tx.signatures.len(), 2);
    assert_eq!(
        tx.signatures[0].to_string(),
        "2nMjR8mdczMJZZ1XeQ5Y37GxfrRQmaV74eypnD9ggpQMmaWfETq9C5DoGKha4bMamu9tFQQArBAgxzQ5vnng1ZdG"
    );
    assert_eq!(
        tx.signatures[1].to_string(),
        "3x7m4nDNGiZiDgadNtewvHKGcCEWe16QpHo197Azs5ybKNqjzbknuF7VFWeHJ6jowdSeDqVZ2EVgpoq9rNoHvPrM"
    );

    assert_eq!(tx.message.header.num_required_signatures, 2);
    assert_eq!(tx.message.header.num_readonly_signed_accounts, 1);
    assert_eq!(tx.message.header.num_readonly_unsigned_accounts, 1);

    assert_eq!(tx.message.account_keys, static_keys());
    assert_eq!(
        tx.message.recent_blockhash,
        "BAx74QRmMwhnTytrPoG5ogw2BQn4CdhB14jxJnbDMUS7".parse().unwrap()
    );

    assert_eq!(
        tx.message.address_table_lookups,
        vec![MessageAddressTableLookup {
            account_key: table_key(),
            writable_indexes: vec![1, 2],
            readonly_indexes: vec![0],
        }]
    );
    assert_eq!(tx.message.total_lookup_index_count(), 3);
}

#[test]
fn reencodes_byte_exactly() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();
    assert_eq!(tx.to_base64().unwrap(), FIXTURE_B64);
}

#[test]
fn role_queries_require_resolution() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();
    let payer = static_keys()[0];
    assert_eq!(tx.message.is_signer(&payer), Err(SolError::UnresolvedLookups));
    assert_eq!(tx.message.signers(), Err(SolError::UnresolvedLookups));
    assert_eq!(
        tx.message.account_meta_list(),
        Err(SolError::UnresolvedLookups)
    );

    // The signer prefix itself is static and stays available.
    assert_eq!(
        tx.message.signer_keys(),
        &static_keys()[..2]
    );
}

#[test]
fn resolution_appends_table_entries_in_lookup_order() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();
    let resolved = tx.message.resolve(&tables()).unwrap();

    // Writable entries (table[1], table[2]) first, then readonly table[0].
    let mut expected = static_keys();
    expected.push(key("FKN5imdi7yadX4axe4hxaqBET4n6DBDRF5LKo5aBF53j"));
    expected.push(key("3or4uF7ZyuQW5GGmcmdXDJasNiSZUURF2az1UrRPYQTg"));
    expected.push(key("2jGpE3ADYRoJPMjyGC4tvqqDfobvdvwGr3vhd66zA1rc"));
    assert_eq!(resolved.account_keys(), expected);
    assert_eq!(
        resolved.account_keys().len(),
        tx.message.account_keys.len() + tx.message.total_lookup_index_count()
    );

    // Resolution is pure: resolving again gives the same value and does not
    // grow the key list further.
    assert_eq!(tx.message.resolve(&tables()).unwrap(), resolved);

    // The signers are the first two static keys.
    assert_eq!(resolved.signers(), static_keys()[..2].to_vec());
    // Loaded addresses never sign.
    for meta in resolved.loaded_addresses() {
        assert!(!meta.is_signer);
    }

    // The original transaction still re-encodes byte-exactly after
    // resolution (the message was never mutated).
    assert_eq!(tx.to_base64().unwrap(), FIXTURE_B64);
}

#[test]
fn resolution_fails_without_the_table() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();
    assert_eq!(
        tx.message.resolve(&AddressTables::new()),
        Err(SolError::LookupTableNotFound(table_key()))
    );
}

#[test]
fn resolution_fails_on_short_table() {
    let tx = Transaction::from_base64(FIXTURE_B64).unwrap();
    let mut tables = AddressTables::new();
    // Only two entries; writable index 2 is out of range.
    tables.insert(
        table_key(),
        vec![
            key("2jGpE3ADYRoJPMjyGC4tvqqDfobvdvwGr3vhd66zA1rc"),
            key("FKN5imdi7yadX4axe4hxaqBET4n6DBDRF5LKo5aBF53j"),
        ],
    );
    assert_eq!(
        tx.message.resolve(&tables),
        Err(SolError::LookupIndexOutOfRange {
            table: table_key(),
            index: 2,
            len: 2,
        })
    );
}
