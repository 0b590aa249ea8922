use crate::error::WalletError;
use crate::types::{Address, OutputIndex, TransactionId, Value};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxOutput {
    #[serde(rename = "addr")]
    pub address: Address,
    #[serde(rename = "val")]
    pub value: Value,
}

/// The previously created output an input consumes. Absent when the
/// indexer does not know the owning address of the spent output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputCoin {
    #[serde(rename = "addr")]
    pub address: Address,
    #[serde(rename = "val")]
    pub value: Value,
    #[serde(rename = "ph")]
    pub prevout_hash: TransactionId,
    #[serde(rename = "pi")]
    pub prevout_index: OutputIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxInput {
    #[serde(default)]
    pub coin: Option<InputCoin>,
}

/// One transaction of the address history, as supplied by the indexer.
/// `block_number` absent means the transaction is still in the mempool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionRecord {
    pub hash: TransactionId,
    #[serde(rename = "block", default)]
    pub block_number: Option<u64>,
    #[serde(rename = "to", default)]
    pub outputs: Vec<TxOutput>,
    #[serde(rename = "from", default)]
    pub inputs: Vec<TxInput>,
}

impl TransactionRecord {
    pub fn is_confirmed(&self) -> bool {
        self.block_number.is_some()
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        validate_hash(&self.hash)?;
        for output in self.outputs.iter() {
            if output.address.is_empty() {
                return Err(WalletError::Validation(format!(
                    "output of {} has an empty address",
                    self.hash
                )));
            }
        }
        for input in self.inputs.iter() {
            if let Some(coin) = &input.coin {
                validate_hash(&coin.prevout_hash)?;
                if coin.address.is_empty() {
                    return Err(WalletError::Validation(format!(
                        "input coin of {} has an empty address",
                        self.hash
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_hash(hash: &TransactionId) -> Result<(), WalletError> {
    if hash.as_ref().is_empty() {
        return Err(WalletError::Validation(
            "transaction hash is empty".to_string(),
        ));
    }
    if hex::decode(hash.as_ref()).is_err() {
        return Err(WalletError::Validation(format!(
            "transaction hash is not hex: {hash}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::tx_record::{InputCoin, TransactionRecord, TxInput, TxOutput};
    use crate::types::{Address, OutputIndex, TransactionId, Value};

    fn record() -> TransactionRecord {
        TransactionRecord {
            hash: TransactionId::new("0a"),
            block_number: Some(10),
            outputs: vec![TxOutput {
                address: Address::new("addr1"),
                value: Value::from(1000),
            }],
            inputs: vec![TxInput {
                coin: Some(InputCoin {
                    address: Address::new("addr2"),
                    value: Value::from(2000),
                    prevout_hash: TransactionId::new("0b"),
                    prevout_index: OutputIndex::new(1),
                }),
            }],
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn empty_hash_rejected() {
        let mut tx = record();
        tx.hash = TransactionId::new("");
        let err = tx.validate().err().unwrap().to_string();
        assert!(err.contains("hash is empty"), "{}", err);
    }

    #[test]
    fn non_hex_hash_rejected() {
        let mut tx = record();
        tx.hash = TransactionId::new("not-hex");
        let err = tx.validate().err().unwrap().to_string();
        assert!(err.contains("not hex"), "{}", err);
    }

    #[test]
    fn bad_prevout_hash_rejected() {
        let mut tx = record();
        tx.inputs[0].coin.as_mut().unwrap().prevout_hash = TransactionId::new("zz");
        assert!(tx.validate().is_err());
    }

    #[test]
    fn input_without_coin_is_fine() {
        let mut tx = record();
        tx.inputs = vec![TxInput { coin: None }];
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn parses_indexer_shape() {
        let raw = r#"{
            "hash": "0a",
            "block": 5,
            "to": [{"addr": "addr1", "val": 1000}],
            "from": [{"coin": {"addr": "addr2", "val": 2000, "ph": "0b", "pi": 1}}, {}]
        }"#;
        let tx: TransactionRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.block_number, Some(5));
        assert_eq!(tx.outputs.len(), 1);
        assert!(tx.inputs[1].coin.is_none());

        let pending = r#"{"hash": "0a", "to": [], "from": []}"#;
        let tx: TransactionRecord = serde_json::from_str(pending).unwrap();
        assert!(!tx.is_confirmed());
    }
}
