//! State events - the ledger of corpus balance changes
//!
//! Every mutation of a corpus balance during a run is represented as a
//! StateEvent. Together they account for every unit of money that entered or
//! left a corpus, which makes it possible to:
//! - Audit where a year's balance came from
//! - Debug waterfall and succession decisions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{CorpusId, EntityRef, Year};
use super::money::Money;

/// A ledger entry recording a balance change with its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub year: Year,
    /// The cashflow, expense or corpus that caused the change
    pub source: Option<EntityRef>,
    pub event: StateEvent,
}

impl LedgerEntry {
    pub fn new(year: Year, event: StateEvent) -> Self {
        Self {
            year,
            source: None,
            event,
        }
    }

    pub fn with_source(year: Year, source: impl Into<EntityRef>, event: StateEvent) -> Self {
        Self {
            year,
            source: Some(source.into()),
            event,
        }
    }
}

/// All possible balance mutations in a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum StateEvent {
    /// Annual growth applied to a corpus
    Appreciation {
        corpus_id: CorpusId,
        previous_balance: Money,
        gain: Money,
        #[serde(with = "rust_decimal::serde::float")]
        growth_rate: Decimal,
    },

    /// Money added to a corpus by a cashflow allocation
    Deposit { corpus_id: CorpusId, amount: Money },

    /// Money taken from a corpus to pay an expense
    Withdrawal { corpus_id: CorpusId, amount: Money },

    /// An ending corpus handed its balance to another corpus
    Succession {
        from: CorpusId,
        to: CorpusId,
        amount: Money,
        /// The configured successor was missing or unset
        via_fallback: bool,
    },
}

impl StateEvent {
    /// True if this event changed `id`'s balance
    pub fn affects(&self, id: &CorpusId) -> bool {
        match self {
            StateEvent::Appreciation { corpus_id, .. }
            | StateEvent::Deposit { corpus_id, .. }
            | StateEvent::Withdrawal { corpus_id, .. } => corpus_id == id,
            StateEvent::Succession { from, to, .. } => from == id || to == id,
        }
    }

    /// Signed change to `id`'s balance caused by this event
    pub fn net_change_for(&self, id: &CorpusId) -> Option<Money> {
        match self {
            StateEvent::Appreciation { corpus_id, gain, .. } if corpus_id == id => Some(*gain),
            StateEvent::Deposit { corpus_id, amount } if corpus_id == id => Some(*amount),
            StateEvent::Withdrawal { corpus_id, amount } if corpus_id == id => Some(-*amount),
            StateEvent::Succession { from, amount, .. } if from == id => Some(-*amount),
            StateEvent::Succession { to, amount, .. } if to == id => Some(*amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Currency, ExpenseId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_net_change() {
        let amount = Money::new(dec!(250), Currency::INR);
        let event = StateEvent::Succession {
            from: CorpusId::from("epf"),
            to: CorpusId::from("mf"),
            amount,
            via_fallback: false,
        };
        assert_eq!(event.net_change_for(&CorpusId::from("epf")), Some(-amount));
        assert_eq!(event.net_change_for(&CorpusId::from("mf")), Some(amount));
        assert_eq!(event.net_change_for(&CorpusId::from("bank")), None);
        assert!(event.affects(&CorpusId::from("mf")));
    }

    #[test]
    fn test_serialized_shape() {
        let entry = LedgerEntry::with_source(
            2030,
            ExpenseId::from("car"),
            StateEvent::Withdrawal {
                corpus_id: CorpusId::from("bank"),
                amount: Money::new(dec!(1500.5), Currency::INR),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["year"], 2030);
        assert_eq!(json["source"]["kind"], "expense");
        assert_eq!(json["source"]["id"], "car");
        assert_eq!(json["event"]["type"], "Withdrawal");
        assert_eq!(json["event"]["corpusId"], "bank");
        assert_eq!(json["event"]["amount"]["amount"], 1500.5);
        assert_eq!(json["event"]["amount"]["currency"], "INR");
    }
}
