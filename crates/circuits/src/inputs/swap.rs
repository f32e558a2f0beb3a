use serde::{Deserialize, Serialize};

use super::signals::{CircuitSignals, SignalReader, SignalWriter};
use super::{InclusionWitness, InputError};
use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::MerkleProof;
use crate::note::Note;
use crate::poseidon::FieldHasher;

/// Pool state and result of one swap step.
///
/// Prices are Q128 fixed point (`sqrt(price) * 2^128`), which does not fit
/// a `u128`, so they are carried as field elements. Nothing here is checked
/// against the AMM math; the swap circuit enforces those relations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub amount_specified: u128,
    pub zero_for_one: bool,
    pub amount0_delta: i128,
    pub amount1_delta: i128,
    pub sqrt_price_old: FieldElement,
    pub new_sqrt_price_x128: FieldElement,
    pub new_tick: i32,
    pub liquidity: u128,
}

impl SwapParams {
    /// Value of the output note: `amount_in - amount_specified + amount1_delta`.
    pub fn output_amount(&self, amount_in: u128) -> Option<u128> {
        let amount_in = i128::try_from(amount_in).ok()?;
        let specified = i128::try_from(self.amount_specified).ok()?;
        let out = amount_in
            .checked_sub(specified)?
            .checked_add(self.amount1_delta)?;
        u128::try_from(out).ok()
    }
}

/// Spends a note through a swap into a new note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapInput {
    pub nullifier: FieldElement,
    pub root: FieldElement,
    pub new_commitment: FieldElement,
    pub amount_specified: u128,
    pub zero_for_one: bool,
    pub amount0_delta: i128,
    pub amount1_delta: i128,
    pub new_sqrt_price_x128: FieldElement,
    pub new_tick: i32,
    pub secret_in: FieldElement,
    pub amount_in: u128,
    pub secret_out: FieldElement,
    pub nullifier_out: FieldElement,
    pub amount_out: u128,
    pub path: MerkleProof,
    pub sqrt_price_old: FieldElement,
    pub liquidity: u128,
}

impl SwapInput {
    pub fn assemble<H: FieldHasher + ?Sized>(
        hasher: &H,
        spent: &Note,
        witness: &InclusionWitness,
        params: &SwapParams,
        output: &Note,
    ) -> Self {
        Self {
            nullifier: spent.nullifier,
            root: witness.root,
            new_commitment: output.commitment(hasher),
            amount_specified: params.amount_specified,
            zero_for_one: params.zero_for_one,
            amount0_delta: params.amount0_delta,
            amount1_delta: params.amount1_delta,
            new_sqrt_price_x128: params.new_sqrt_price_x128,
            new_tick: params.new_tick,
            secret_in: spent.secret,
            amount_in: spent.amount,
            secret_out: output.secret,
            nullifier_out: output.nullifier,
            amount_out: output.amount,
            path: witness.proof.clone(),
            sqrt_price_old: params.sqrt_price_old,
            liquidity: params.liquidity,
        }
    }
}

impl CircuitSignals for SwapInput {
    const KIND: CircuitKind = CircuitKind::Swap;
    const SIGNALS: &'static [&'static str] = &[
        "nullifier",
        "root",
        "new_commitment",
        "amount_specified",
        "zero_for_one",
        "amount0_delta",
        "amount1_delta",
        "new_sqrt_price_x128",
        "new_tick",
        "secret_in",
        "amount_in",
        "secret_out",
        "nullifier_out",
        "amount_out",
        "pathElements",
        "pathIndices",
        "sqrt_price_old",
        "liquidity",
    ];

    fn write_signals(&self, out: &mut SignalWriter) {
        out.field("nullifier", &self.nullifier)
            .field("root", &self.root)
            .field("new_commitment", &self.new_commitment)
            .int("amount_specified", self.amount_specified)
            .flag("zero_for_one", self.zero_for_one)
            .int("amount0_delta", self.amount0_delta)
            .int("amount1_delta", self.amount1_delta)
            .field("new_sqrt_price_x128", &self.new_sqrt_price_x128)
            .int("new_tick", self.new_tick)
            .field("secret_in", &self.secret_in)
            .int("amount_in", self.amount_in)
            .field("secret_out", &self.secret_out)
            .field("nullifier_out", &self.nullifier_out)
            .int("amount_out", self.amount_out)
            .path(&self.path)
            .field("sqrt_price_old", &self.sqrt_price_old)
            .int("liquidity", self.liquidity);
    }

    fn read_signals(reader: &SignalReader<'_>) -> Result<Self, InputError> {
        Ok(Self {
            nullifier: reader.field("nullifier")?,
            root: reader.field("root")?,
            new_commitment: reader.field("new_commitment")?,
            amount_specified: reader.int("amount_specified")?,
            zero_for_one: reader.flag("zero_for_one")?,
            amount0_delta: reader.int("amount0_delta")?,
            amount1_delta: reader.int("amount1_delta")?,
            new_sqrt_price_x128: reader.field("new_sqrt_price_x128")?,
            new_tick: reader.int("new_tick")?,
            secret_in: reader.field("secret_in")?,
            amount_in: reader.int("amount_in")?,
            secret_out: reader.field("secret_out")?,
            nullifier_out: reader.field("nullifier_out")?,
            amount_out: reader.int("amount_out")?,
            path: reader.path()?,
            sqrt_price_old: reader.field("sqrt_price_old")?,
            liquidity: reader.int("liquidity")?,
        })
    }
}
