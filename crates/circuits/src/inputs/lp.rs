use serde::{Deserialize, Serialize};

use super::signals::{CircuitSignals, SignalReader, SignalWriter};
use super::{InclusionWitness, InputError};
use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::MerkleProof;
use crate::note::{Note, Position};
use crate::poseidon::FieldHasher;

/// Range and size of the position being opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl LpParams {
    /// What is left of `amount_in` after funding the position.
    pub fn change_amount(&self, amount_in: u128) -> Option<u128> {
        amount_in.checked_sub(self.liquidity)
    }
}

/// Spends a note into an LP position plus a change note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpInput {
    pub nullifier: FieldElement,
    pub root: FieldElement,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub new_commitment: FieldElement,
    pub position_commitment: FieldElement,
    pub secret_in: FieldElement,
    pub amount_in: u128,
    pub secret_out: FieldElement,
    pub nullifier_out: FieldElement,
    pub amount_out: u128,
    pub path: MerkleProof,
}

impl LpInput {
    /// The position is owned by the spent note's secret; `change` is the
    /// note receiving whatever the position does not absorb.
    pub fn assemble<H: FieldHasher + ?Sized>(
        hasher: &H,
        spent: &Note,
        witness: &InclusionWitness,
        params: &LpParams,
        change: &Note,
    ) -> Self {
        let position = Position::new(spent.secret, params.tick_lower, params.tick_upper);
        Self {
            nullifier: spent.nullifier,
            root: witness.root,
            tick_lower: params.tick_lower,
            tick_upper: params.tick_upper,
            liquidity: params.liquidity,
            new_commitment: change.commitment(hasher),
            position_commitment: position.commitment(hasher),
            secret_in: spent.secret,
            amount_in: spent.amount,
            secret_out: change.secret,
            nullifier_out: change.nullifier,
            amount_out: change.amount,
            path: witness.proof.clone(),
        }
    }
}

impl CircuitSignals for LpInput {
    const KIND: CircuitKind = CircuitKind::Lp;
    const SIGNALS: &'static [&'static str] = &[
        "nullifier",
        "root",
        "tick_lower",
        "tick_upper",
        "liquidity",
        "new_commitment",
        "position_commitment",
        "secret_in",
        "amount_in",
        "secret_out",
        "nullifier_out",
        "amount_out",
        "pathElements",
        "pathIndices",
    ];

    fn write_signals(&self, out: &mut SignalWriter) {
        out.field("nullifier", &self.nullifier)
            .field("root", &self.root)
            .int("tick_lower", self.tick_lower)
            .int("tick_upper", self.tick_upper)
            .int("liquidity", self.liquidity)
            .field("new_commitment", &self.new_commitment)
            .field("position_commitment", &self.position_commitment)
            .field("secret_in", &self.secret_in)
            .int("amount_in", self.amount_in)
            .field("secret_out", &self.secret_out)
            .field("nullifier_out", &self.nullifier_out)
            .int("amount_out", self.amount_out)
            .path(&self.path);
    }

    fn read_signals(reader: &SignalReader<'_>) -> Result<Self, InputError> {
        Ok(Self {
            nullifier: reader.field("nullifier")?,
            root: reader.field("root")?,
            tick_lower: reader.int("tick_lower")?,
            tick_upper: reader.int("tick_upper")?,
            liquidity: reader.int("liquidity")?,
            new_commitment: reader.field("new_commitment")?,
            position_commitment: reader.field("position_commitment")?,
            secret_in: reader.field("secret_in")?,
            amount_in: reader.int("amount_in")?,
            secret_out: reader.field("secret_out")?,
            nullifier_out: reader.field("nullifier_out")?,
            amount_out: reader.int("amount_out")?,
            path: reader.path()?,
        })
    }
}
