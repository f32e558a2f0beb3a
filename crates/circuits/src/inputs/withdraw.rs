use super::signals::{CircuitSignals, SignalReader, SignalWriter};
use super::{InclusionWitness, InputError};
use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::MerkleProof;
use crate::note::Note;

/// Spends a note to `recipient`, revealing its nullifier and amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawInput {
    pub nullifier: FieldElement,
    pub root: FieldElement,
    pub recipient: FieldElement,
    pub amount: u128,
    pub secret: FieldElement,
    pub path: MerkleProof,
}

impl WithdrawInput {
    pub fn assemble(note: &Note, witness: &InclusionWitness, recipient: FieldElement) -> Self {
        Self {
            nullifier: note.nullifier,
            root: witness.root,
            recipient,
            amount: note.amount,
            secret: note.secret,
            path: witness.proof.clone(),
        }
    }
}

impl CircuitSignals for WithdrawInput {
    const KIND: CircuitKind = CircuitKind::Withdraw;
    const SIGNALS: &'static [&'static str] = &[
        "nullifier",
        "root",
        "recipient",
        "amount",
        "secret",
        "pathElements",
        "pathIndices",
    ];

    fn write_signals(&self, out: &mut SignalWriter) {
        out.field("nullifier", &self.nullifier)
            .field("root", &self.root)
            .field("recipient", &self.recipient)
            .int("amount", self.amount)
            .field("secret", &self.secret)
            .path(&self.path);
    }

    fn read_signals(reader: &SignalReader<'_>) -> Result<Self, InputError> {
        Ok(Self {
            nullifier: reader.field("nullifier")?,
            root: reader.field("root")?,
            recipient: reader.field("recipient")?,
            amount: reader.int("amount")?,
            secret: reader.field("secret")?,
            path: reader.path()?,
        })
    }
}
