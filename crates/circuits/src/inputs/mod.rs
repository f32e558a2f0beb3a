//! Circuit input assembly.
//!
//! Each circuit has a typed input struct whose fields are the circuit's
//! input signals. [`CircuitInput`] tags them by kind and converts to and
//! from the JSON object the witness generator consumes.

mod lp;
mod membership;
mod signals;
mod swap;
mod withdraw;

use serde_json::Value;
use thiserror::Error;

pub use lp::{LpInput, LpParams};
pub use membership::MembershipInput;
pub use swap::{SwapInput, SwapParams};
pub use withdraw::WithdrawInput;

use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::{MerkleError, MerkleProof, MerkleTree};
use signals::{CircuitSignals, SignalReader, SignalWriter};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{circuit} input is missing required field `{field}`")]
    MissingField {
        circuit: CircuitKind,
        field: &'static str,
    },
    #[error("{circuit} input field `{field}` is invalid: {reason}")]
    InvalidValue {
        circuit: CircuitKind,
        field: String,
        reason: String,
    },
    #[error("{circuit} input must be a JSON object")]
    NotAnObject { circuit: CircuitKind },
}

/// A tree root together with the path of one leaf under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionWitness {
    pub root: FieldElement,
    pub proof: MerkleProof,
}

impl InclusionWitness {
    pub fn from_tree(tree: &MerkleTree, leaf_index: u64) -> Result<Self, MerkleError> {
        Ok(Self {
            root: tree.root(),
            proof: tree.prove_inclusion(leaf_index)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CircuitInput {
    Membership(MembershipInput),
    Withdraw(WithdrawInput),
    Swap(SwapInput),
    Lp(LpInput),
}

impl CircuitInput {
    pub fn kind(&self) -> CircuitKind {
        match self {
            CircuitInput::Membership(_) => MembershipInput::KIND,
            CircuitInput::Withdraw(_) => WithdrawInput::KIND,
            CircuitInput::Swap(_) => SwapInput::KIND,
            CircuitInput::Lp(_) => LpInput::KIND,
        }
    }

    /// Signal names the circuit expects, in declaration order.
    pub fn signal_names(kind: CircuitKind) -> &'static [&'static str] {
        match kind {
            CircuitKind::Membership => MembershipInput::SIGNALS,
            CircuitKind::Withdraw => WithdrawInput::SIGNALS,
            CircuitKind::Swap => SwapInput::SIGNALS,
            CircuitKind::Lp => LpInput::SIGNALS,
        }
    }

    /// Render as the witness generator's input object.
    pub fn to_signals(&self) -> Value {
        let mut out = SignalWriter::default();
        match self {
            CircuitInput::Membership(input) => input.write_signals(&mut out),
            CircuitInput::Withdraw(input) => input.write_signals(&mut out),
            CircuitInput::Swap(input) => input.write_signals(&mut out),
            CircuitInput::Lp(input) => input.write_signals(&mut out),
        }
        out.finish()
    }

    /// Parse a dynamically built input object (e.g. loaded from a file).
    pub fn from_signals(kind: CircuitKind, value: &Value) -> Result<Self, InputError> {
        let reader = SignalReader::new(kind, value)?;
        Ok(match kind {
            CircuitKind::Membership => {
                CircuitInput::Membership(MembershipInput::read_signals(&reader)?)
            }
            CircuitKind::Withdraw => CircuitInput::Withdraw(WithdrawInput::read_signals(&reader)?),
            CircuitKind::Swap => CircuitInput::Swap(SwapInput::read_signals(&reader)?),
            CircuitKind::Lp => CircuitInput::Lp(LpInput::read_signals(&reader)?),
        })
    }

    /// Root the input claims membership under.
    pub fn root(&self) -> FieldElement {
        match self {
            CircuitInput::Membership(input) => input.root,
            CircuitInput::Withdraw(input) => input.root,
            CircuitInput::Swap(input) => input.root,
            CircuitInput::Lp(input) => input.root,
        }
    }
}

impl From<MembershipInput> for CircuitInput {
    fn from(input: MembershipInput) -> Self {
        CircuitInput::Membership(input)
    }
}

impl From<WithdrawInput> for CircuitInput {
    fn from(input: WithdrawInput) -> Self {
        CircuitInput::Withdraw(input)
    }
}

impl From<SwapInput> for CircuitInput {
    fn from(input: SwapInput) -> Self {
        CircuitInput::Swap(input)
    }
}

impl From<LpInput> for CircuitInput {
    fn from(input: LpInput) -> Self {
        CircuitInput::Lp(input)
    }
}
