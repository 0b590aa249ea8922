use crate::error::WalletError;
use crate::types::{UnspentEntry, Value};
use itertools::Itertools;

/// Inputs chosen to fund a payment. `change` is what goes back to the
/// payer once amount and fee are covered; by construction it is never
/// negative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionPlan {
    pub inputs: Vec<UnspentEntry>,
    pub total_input_value: Value,
    pub change: Value,
}

/// Strategy seam for coin selection. Implementations only ever see
/// unspent entries and must never pick unconfirmed ones.
pub trait InputSelectionAlgorithm {
    fn select(
        &self,
        available_inputs: &[UnspentEntry],
        amount: Value,
        fee: Value,
    ) -> Result<SelectionPlan, WalletError>;
}

/// Greedy largest-first selection. Deterministic and bounds the input
/// count, at the cost of not minimizing change.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestFirst;

impl InputSelectionAlgorithm for LargestFirst {
    fn select(
        &self,
        available_inputs: &[UnspentEntry],
        amount: Value,
        fee: Value,
    ) -> Result<SelectionPlan, WalletError> {
        let ordered = eligible(available_inputs)
            .sorted_by(|a, b| b.value.cmp(&a.value).then_with(|| a.pointer.cmp(&b.pointer)));
        accumulate(ordered, amount, fee)
    }
}

/// Consumes small outputs first. Spends more inputs than largest-first
/// but leaves the wallet with fewer dust entries over time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmallestFirst;

impl InputSelectionAlgorithm for SmallestFirst {
    fn select(
        &self,
        available_inputs: &[UnspentEntry],
        amount: Value,
        fee: Value,
    ) -> Result<SelectionPlan, WalletError> {
        let ordered = eligible(available_inputs)
            .sorted_by(|a, b| a.value.cmp(&b.value).then_with(|| a.pointer.cmp(&b.pointer)));
        accumulate(ordered, amount, fee)
    }
}

fn eligible(available_inputs: &[UnspentEntry]) -> impl Iterator<Item = &UnspentEntry> {
    available_inputs.iter().filter(|entry| entry.confirmed)
}

fn accumulate<'a>(
    ordered: impl Iterator<Item = &'a UnspentEntry>,
    amount: Value,
    fee: Value,
) -> Result<SelectionPlan, WalletError> {
    if amount.is_zero() {
        return Err(WalletError::Validation(
            "requested amount must be positive".to_string(),
        ));
    }
    let required = amount.checked_add(fee).ok_or_else(|| {
        WalletError::Validation("amount plus fee overflows the satoshi range".to_string())
    })?;

    let mut chosen = Vec::<UnspentEntry>::new();
    let mut total = Value::zero();
    for entry in ordered {
        total = total.checked_add(entry.value).ok_or_else(|| {
            WalletError::Validation("summed input values overflow the satoshi range".to_string())
        })?;
        chosen.push(entry.clone());
        if total >= required {
            return Ok(SelectionPlan {
                inputs: chosen,
                total_input_value: total,
                change: total - required,
            });
        }
    }

    Err(WalletError::InsufficientFunds {
        required,
        available: total,
    })
}

/// Caller-side policy for accepting a payment request. 546 satoshis is
/// the conventional threshold below which an output is uneconomical to
/// create.
#[derive(Clone, Copy, Debug)]
pub struct PaymentPolicy {
    pub min_payment: Value,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            min_payment: Value::new(546),
        }
    }
}

impl PaymentPolicy {
    pub fn validate_request(&self, amount: Value) -> Result<(), WalletError> {
        if amount < self.min_payment {
            return Err(WalletError::Validation(format!(
                "requested amount {amount} is below the minimum of {}",
                self.min_payment
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WalletError;
    use crate::select::{
        InputSelectionAlgorithm, LargestFirst, PaymentPolicy, SmallestFirst,
    };
    use crate::types::{OutputIndex, TransactionId, UnspentEntry, UtxoPointer, Value};

    fn entry(hash: &str, value: u64, confirmed: bool) -> UnspentEntry {
        UnspentEntry {
            pointer: UtxoPointer {
                transaction_id: TransactionId::new(hash),
                output_index: OutputIndex::new(0),
            },
            value: Value::from(value),
            confirmed,
        }
    }

    #[test]
    fn single_entry_covers_request() {
        let entries = vec![entry("aa", 50000, true)];
        let plan = LargestFirst
            .select(&entries, Value::from(10000), Value::from(1000))
            .unwrap();
        assert_eq!(plan.inputs.len(), 1);
        assert_eq!(plan.total_input_value, Value::from(50000));
        assert_eq!(plan.change, Value::from(39000));
    }

    #[test]
    fn stops_once_request_is_covered() {
        let entries = vec![
            entry("aa", 3000, true),
            entry("bb", 9000, true),
            entry("cc", 5000, true),
        ];
        let plan = LargestFirst
            .select(&entries, Value::from(10000), Value::from(500))
            .unwrap();
        // 9000 + 5000 covers it, the 3000 entry stays untouched
        assert_eq!(plan.inputs.len(), 2);
        assert_eq!(plan.inputs[0].value, Value::from(9000));
        assert_eq!(plan.inputs[1].value, Value::from(5000));
        assert_eq!(plan.change, Value::from(3500));
    }

    #[test]
    fn unconfirmed_entries_are_never_selected() {
        let entries = vec![entry("aa", 100000, false), entry("bb", 2000, true)];
        let result = LargestFirst.select(&entries, Value::from(5000), Value::zero());
        match result {
            Err(WalletError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, Value::from(5000));
                assert_eq!(available, Value::from(2000));
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
    }

    #[test]
    fn exact_shortfall_is_reported() {
        let entries = vec![entry("aa", 400, true), entry("bb", 500, true)];
        let err = LargestFirst
            .select(&entries, Value::from(1000), Value::from(100))
            .err()
            .unwrap();
        assert_eq!(err.shortfall(), Some(Value::from(200)));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let entries = vec![entry("aa", 1000, true)];
        let result = LargestFirst.select(&entries, Value::zero(), Value::from(10));
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[test]
    fn strategies_substitute_through_the_trait() {
        let entries = vec![
            entry("aa", 1000, true),
            entry("bb", 4000, true),
            entry("cc", 8000, true),
        ];
        let strategies: Vec<Box<dyn InputSelectionAlgorithm>> =
            vec![Box::new(LargestFirst), Box::new(SmallestFirst)];
        for strategy in strategies.iter() {
            let plan = strategy
                .select(&entries, Value::from(4500), Value::from(100))
                .unwrap();
            assert!(plan.total_input_value >= Value::from(4600));
            assert_eq!(
                plan.change,
                plan.total_input_value - Value::from(4600)
            );
        }
    }

    #[test]
    fn smallest_first_consumes_dust_first() {
        let entries = vec![
            entry("aa", 8000, true),
            entry("bb", 1000, true),
            entry("cc", 2000, true),
        ];
        let plan = SmallestFirst
            .select(&entries, Value::from(2500), Value::zero())
            .unwrap();
        assert_eq!(plan.inputs.len(), 2);
        assert_eq!(plan.inputs[0].value, Value::from(1000));
        assert_eq!(plan.inputs[1].value, Value::from(2000));
        assert_eq!(plan.change, Value::from(500));
    }

    #[test]
    fn overflowing_request_or_inputs_rejected() {
        let entries = vec![entry("aa", 1000, true)];
        let result = LargestFirst.select(&entries, Value::from(u64::MAX), Value::from(1));
        assert!(matches!(result, Err(WalletError::Validation(_))));

        let entries = vec![entry("aa", u64::MAX - 1, true), entry("bb", 2, true)];
        let result = LargestFirst.select(&entries, Value::from(u64::MAX), Value::zero());
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[test]
    fn payment_policy_enforces_minimum() {
        let policy = PaymentPolicy::default();
        assert!(policy.validate_request(Value::from(546)).is_ok());
        assert!(policy.validate_request(Value::from(545)).is_err());

        let relaxed = PaymentPolicy {
            min_payment: Value::from(1),
        };
        assert!(relaxed.validate_request(Value::from(1)).is_ok());
    }
}
