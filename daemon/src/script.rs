//! Operation scripts: a JSON array of tagged ledger operations replayed
//! against a node, one JSON result line per step.
//!
//! ```json
//! [
//!   {"op": "deposit", "who": "alice", "amount": 100000000},
//!   {"op": "quick_transfer", "sender": "alice", "recipient": "bob", "amount": 5000000},
//!   {"op": "claim_transfer", "caller": "bob", "id": 1}
//! ]
//! ```
//!
//! Amounts are plain JSON integers and must fit in 64 bits.

use std::io::Write;

use remit_escrow::{EscrowError, ExchangeRate, TransferRecord};
use remit_node::{LedgerNode, NodeError};
use remit_nullables::NullCustody;
use remit_types::params::DEFAULT_EXPIRY;
use remit_types::{CountryCode, Identity, PairKey, TransferId};
use serde::{Deserialize, Serialize};

fn default_expiry() -> u64 {
    DEFAULT_EXPIRY
}

/// One step of a script.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Deposit {
        who: Identity,
        amount: u64,
    },
    Withdraw {
        who: Identity,
        amount: u64,
    },
    CreateTransfer {
        sender: Identity,
        recipient: Identity,
        amount: u64,
        country_from: CountryCode,
        country_to: CountryCode,
        #[serde(default = "default_expiry")]
        expiry_duration: u64,
    },
    QuickTransfer {
        sender: Identity,
        recipient: Identity,
        amount: u64,
    },
    ClaimTransfer {
        caller: Identity,
        id: TransferId,
    },
    CancelExpiredTransfer {
        caller: Identity,
        id: TransferId,
    },
    BatchClaim {
        caller: Identity,
        ids: Vec<TransferId>,
    },
    SetExchangeRate {
        caller: Identity,
        pair: PairKey,
        rate: u64,
    },
    Pause {
        caller: Identity,
    },
    Unpause {
        caller: Identity,
    },
    WithdrawFees {
        caller: Identity,
    },
    BalanceOf {
        who: Identity,
    },
    GetTransfer {
        id: TransferId,
    },
    CheckExpired {
        id: TransferId,
    },
    ExchangeRate {
        pair: PairKey,
    },
    FeePool,
    Audit,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::CreateTransfer { .. } => "create_transfer",
            Self::QuickTransfer { .. } => "quick_transfer",
            Self::ClaimTransfer { .. } => "claim_transfer",
            Self::CancelExpiredTransfer { .. } => "cancel_expired_transfer",
            Self::BatchClaim { .. } => "batch_claim",
            Self::SetExchangeRate { .. } => "set_exchange_rate",
            Self::Pause { .. } => "pause",
            Self::Unpause { .. } => "unpause",
            Self::WithdrawFees { .. } => "withdraw_fees",
            Self::BalanceOf { .. } => "balance_of",
            Self::GetTransfer { .. } => "get_transfer",
            Self::CheckExpired { .. } => "check_expired",
            Self::ExchangeRate { .. } => "exchange_rate",
            Self::FeePool => "fee_pool",
            Self::Audit => "audit",
        }
    }
}

/// Parse a script from its JSON text.
pub fn parse(text: &str) -> Result<Vec<Operation>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Successful result payload of a step.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Id(TransferId),
    Amount(u128),
    Flag(bool),
    Transfer(Option<TransferRecord>),
    Rate(Option<ExchangeRate>),
    Batch(Vec<BatchItem>),
}

#[derive(Debug, PartialEq, Serialize)]
pub struct BatchItem {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), EscrowError>> for BatchItem {
    fn from(result: Result<(), EscrowError>) -> Self {
        match result {
            Ok(()) => Self { ok: true, code: None, error: None },
            Err(e) => Self { ok: false, code: Some(e.code()), error: Some(e.to_string()) },
        }
    }
}

/// The JSON line emitted for each step.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub step: usize,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    fn new(step: usize, op: &'static str, result: Result<Option<Reply>, NodeError>) -> Self {
        match result {
            Ok(value) => Self { step, op, ok: true, value, code: None, error: None },
            Err(e) => Self {
                step,
                op,
                ok: false,
                value: None,
                code: e.as_escrow().map(EscrowError::code),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Apply one operation to the node.
pub fn apply(node: &LedgerNode<NullCustody>, op: &Operation) -> Result<Option<Reply>, NodeError> {
    let reply = match op {
        Operation::Deposit { who, amount } => {
            node.deposit(who, u128::from(*amount))?;
            None
        }
        Operation::Withdraw { who, amount } => {
            node.withdraw(who, u128::from(*amount))?;
            None
        }
        Operation::CreateTransfer {
            sender,
            recipient,
            amount,
            country_from,
            country_to,
            expiry_duration,
        } => Some(Reply::Id(node.create_transfer(
            sender,
            recipient,
            u128::from(*amount),
            country_from.clone(),
            country_to.clone(),
            *expiry_duration,
        )?)),
        Operation::QuickTransfer { sender, recipient, amount } => Some(Reply::Id(
            node.quick_transfer(sender, recipient, u128::from(*amount))?,
        )),
        Operation::ClaimTransfer { caller, id } => {
            node.claim_transfer(caller, *id)?;
            None
        }
        Operation::CancelExpiredTransfer { caller, id } => {
            node.cancel_expired_transfer(caller, *id)?;
            None
        }
        Operation::BatchClaim { caller, ids } => {
            let results = node.batch_claim(caller, ids)?;
            Some(Reply::Batch(results.into_iter().map(BatchItem::from).collect()))
        }
        Operation::SetExchangeRate { caller, pair, rate } => {
            node.set_exchange_rate(caller, pair.clone(), u128::from(*rate))?;
            None
        }
        Operation::Pause { caller } => {
            node.pause(caller)?;
            None
        }
        Operation::Unpause { caller } => {
            node.unpause(caller)?;
            None
        }
        Operation::WithdrawFees { caller } => Some(Reply::Amount(node.withdraw_fees(caller)?)),
        Operation::BalanceOf { who } => Some(Reply::Amount(node.balance_of(who))),
        Operation::GetTransfer { id } => Some(Reply::Transfer(node.get_transfer(*id))),
        Operation::CheckExpired { id } => Some(Reply::Flag(node.check_expired(*id))),
        Operation::ExchangeRate { pair } => Some(Reply::Rate(node.exchange_rate(pair))),
        Operation::FeePool => Some(Reply::Amount(node.fee_pool())),
        Operation::Audit => {
            node.audit()?;
            None
        }
    };
    Ok(reply)
}

/// Replay `ops` in order, writing one JSON line per step. Rejected steps are
/// reported and the replay carries on. Returns the number of rejected steps.
pub fn replay(
    node: &LedgerNode<NullCustody>,
    ops: &[Operation],
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let mut rejected = 0;
    for (step, op) in ops.iter().enumerate() {
        let outcome = Outcome::new(step, op.name(), apply(node, op));
        if !outcome.ok {
            rejected += 1;
        }
        serde_json::to_writer(&mut *out, &outcome)?;
        writeln!(out)?;
    }
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn node() -> LedgerNode<NullCustody> {
        LedgerNode::new(
            id("owner"),
            NullCustody::with_funding([(id("alice"), 1_000_000_000)]),
        )
    }

    fn lines(node: &LedgerNode<NullCustody>, script: &str) -> (usize, Vec<serde_json::Value>) {
        let ops = parse(script).unwrap();
        let mut out = Vec::new();
        let rejected = replay(node, &ops, &mut out).unwrap();
        let parsed = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (rejected, parsed)
    }

    #[test]
    fn parses_tagged_operations() {
        let ops = parse(
            r#"[
                {"op": "deposit", "who": "alice", "amount": 5},
                {"op": "create_transfer", "sender": "alice", "recipient": "bob",
                 "amount": 3, "country_from": "USA", "country_to": "MEX"},
                {"op": "fee_pool"}
            ]"#,
        )
        .unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], Operation::Deposit { who: id("alice"), amount: 5 });
        match &ops[1] {
            Operation::CreateTransfer { expiry_duration, .. } => {
                assert_eq!(*expiry_duration, DEFAULT_EXPIRY)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ops[2], Operation::FeePool);
    }

    #[test]
    fn rejects_bad_inputs_at_parse_time() {
        assert!(parse(r#"[{"op": "deposit", "who": "has space", "amount": 1}]"#).is_err());
        assert!(parse(r#"[{"op": "create_transfer", "sender": "a", "recipient": "b",
            "amount": 1, "country_from": "LONG", "country_to": "MEX"}]"#)
        .is_err());
        assert!(parse(r#"[{"op": "teleport"}]"#).is_err());
    }

    #[test]
    fn replay_reports_each_step() {
        let node = node();
        let (rejected, out) = lines(
            &node,
            r#"[
                {"op": "deposit", "who": "alice", "amount": 100000000},
                {"op": "quick_transfer", "sender": "alice", "recipient": "bob", "amount": 5000000},
                {"op": "claim_transfer", "caller": "carol", "id": 1},
                {"op": "claim_transfer", "caller": "bob", "id": 1},
                {"op": "balance_of", "who": "bob"},
                {"op": "audit"}
            ]"#,
        );
        assert_eq!(rejected, 1);
        assert_eq!(out.len(), 6);
        assert_eq!(out[1]["value"], 1);
        assert_eq!(out[2]["ok"], false);
        assert_eq!(out[2]["code"], 100);
        assert_eq!(out[3]["ok"], true);
        assert_eq!(out[4]["value"], 5_000_000);
        assert_eq!(out[5]["op"], "audit");
    }

    #[test]
    fn batch_claim_lists_per_item_results() {
        let node = node();
        let (_, out) = lines(
            &node,
            r#"[
                {"op": "deposit", "who": "alice", "amount": 100000000},
                {"op": "quick_transfer", "sender": "alice", "recipient": "bob", "amount": 5000000},
                {"op": "batch_claim", "caller": "bob", "ids": [1, 7]},
                {"op": "batch_claim", "caller": "bob", "ids": []}
            ]"#,
        );
        let items = out[2]["value"].as_array().unwrap();
        assert_eq!(items[0]["ok"], true);
        assert_eq!(items[1]["code"], 103);
        assert_eq!(out[3]["code"], 102);
    }

    #[test]
    fn custody_failures_carry_no_ledger_code() {
        let node = node();
        let (rejected, out) = lines(&node, r#"[{"op": "deposit", "who": "dave", "amount": 10}]"#);
        assert_eq!(rejected, 1);
        assert!(out[0].get("code").is_none());
        assert!(out[0]["error"].as_str().unwrap().contains("custody"));
    }
}
