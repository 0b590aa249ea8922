use crate::error::WalletError;
use crate::tx_record::TransactionRecord;
use crate::types::{Address, OutputIndex, TransactionId, UnspentEntry, UtxoPointer, Value};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtxoEntry {
    pub value: Value,
    pub spent: bool,
    pub confirmed: bool,
}

/// Aggregate figures over one address at one history snapshot. Computed
/// fresh per call and discarded after use; there is no cache to
/// invalidate when new history arrives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub incoming_confirmed: Value,
    pub incoming_pending: Value,
    pub outgoing_confirmed: Value,
    pub outgoing_pending: Value,
    pub available_balance: Value,
    pub unspent_entries: Vec<UnspentEntry>,
}

/// Rebuilds the utxo set of `address` from its full transaction history.
///
/// Two folds over the records: the first collects every prevout the
/// address spends, the second classifies every output the address
/// receives against that spent set. The spent set must be complete
/// before classification starts because a spending transaction may
/// appear anywhere in the input ordering relative to the transaction
/// that created the output; for the same reason the caller must hand in
/// a finalized snapshot, never a partial feed.
pub fn reconstruct(
    address: &Address,
    transactions: &[TransactionRecord],
) -> Result<(HashMap<UtxoPointer, UtxoEntry>, BalanceSnapshot), WalletError> {
    // Reject the whole batch before classifying anything.
    for tx in transactions.iter() {
        tx.validate()?;
    }

    // A record repeated with identical content is the same observation
    // and must not count twice; a repeat with different content stays in
    // so the latest observation wins during classification.
    let mut latest_by_hash = HashMap::<&TransactionId, &TransactionRecord>::new();
    let mut records = Vec::<&TransactionRecord>::with_capacity(transactions.len());
    for tx in transactions.iter() {
        if latest_by_hash.get(&tx.hash) == Some(&tx) {
            continue;
        }
        latest_by_hash.insert(&tx.hash, tx);
        records.push(tx);
    }

    let mut spent_outputs = HashSet::<UtxoPointer>::new();
    for tx in records.iter() {
        for input in tx.inputs.iter() {
            let coin = match &input.coin {
                Some(coin) if &coin.address == address => coin,
                _ => continue,
            };
            spent_outputs.insert(UtxoPointer {
                transaction_id: coin.prevout_hash.clone(),
                output_index: coin.prevout_index,
            });
        }
    }

    let mut utxos = HashMap::<UtxoPointer, UtxoEntry>::new();
    let mut snapshot = BalanceSnapshot::default();

    for tx in records.iter() {
        for (output_index, output) in tx.outputs.iter().enumerate() {
            if &output.address != address {
                continue;
            }
            let pointer = UtxoPointer {
                transaction_id: tx.hash.clone(),
                output_index: OutputIndex::new(output_index as u64),
            };
            let entry = UtxoEntry {
                value: output.value,
                spent: spent_outputs.contains(&pointer),
                confirmed: tx.is_confirmed(),
            };
            if let Some(previous) = utxos.insert(pointer.clone(), entry.clone()) {
                if previous != entry {
                    tracing::warn!(
                        "conflicting duplicate record for {}, keeping the latest",
                        pointer
                    );
                }
            }
            if tx.is_confirmed() {
                snapshot.incoming_confirmed = checked_sum(snapshot.incoming_confirmed, output.value)?;
            } else {
                snapshot.incoming_pending = checked_sum(snapshot.incoming_pending, output.value)?;
            }
        }

        for input in tx.inputs.iter() {
            let coin = match &input.coin {
                Some(coin) if &coin.address == address => coin,
                _ => continue,
            };
            // Outgoing is split by the consuming transaction's state,
            // not by the state of the transaction that created the coin.
            if tx.is_confirmed() {
                snapshot.outgoing_confirmed = checked_sum(snapshot.outgoing_confirmed, coin.value)?;
            } else {
                snapshot.outgoing_pending = checked_sum(snapshot.outgoing_pending, coin.value)?;
            }
        }
    }

    for (pointer, entry) in utxos.iter() {
        if entry.spent {
            continue;
        }
        if entry.confirmed {
            snapshot.available_balance = checked_sum(snapshot.available_balance, entry.value)?;
        }
        snapshot.unspent_entries.push(UnspentEntry {
            pointer: pointer.clone(),
            value: entry.value,
            confirmed: entry.confirmed,
        });
    }
    snapshot
        .unspent_entries
        .sort_by(|a, b| a.pointer.cmp(&b.pointer));

    Ok((utxos, snapshot))
}

fn checked_sum(total: Value, value: Value) -> Result<Value, WalletError> {
    total.checked_add(value).ok_or_else(|| {
        WalletError::Validation("summed values overflow the satoshi range".to_string())
    })
}
