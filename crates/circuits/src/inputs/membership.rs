use super::signals::{CircuitSignals, SignalReader, SignalWriter};
use super::{InclusionWitness, InputError};
use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::MerkleProof;
use crate::note::Note;
use crate::poseidon::FieldHasher;

/// Proves a committed note is in the tree; reveals root and commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipInput {
    pub root: FieldElement,
    pub commitment: FieldElement,
    pub secret: FieldElement,
    pub nullifier: FieldElement,
    pub amount: u128,
    pub path: MerkleProof,
}

impl MembershipInput {
    pub fn assemble<H: FieldHasher + ?Sized>(
        hasher: &H,
        note: &Note,
        witness: &InclusionWitness,
    ) -> Self {
        Self {
            root: witness.root,
            commitment: note.commitment(hasher),
            secret: note.secret,
            nullifier: note.nullifier,
            amount: note.amount,
            path: witness.proof.clone(),
        }
    }
}

impl CircuitSignals for MembershipInput {
    const KIND: CircuitKind = CircuitKind::Membership;
    const SIGNALS: &'static [&'static str] = &[
        "root",
        "commitment",
        "secret",
        "nullifier",
        "amount",
        "pathElements",
        "pathIndices",
    ];

    fn write_signals(&self, out: &mut SignalWriter) {
        out.field("root", &self.root)
            .field("commitment", &self.commitment)
            .field("secret", &self.secret)
            .field("nullifier", &self.nullifier)
            .int("amount", self.amount)
            .path(&self.path);
    }

    fn read_signals(reader: &SignalReader<'_>) -> Result<Self, InputError> {
        Ok(Self {
            root: reader.field("root")?,
            commitment: reader.field("commitment")?,
            secret: reader.field("secret")?,
            nullifier: reader.field("nullifier")?,
            amount: reader.int("amount")?,
            path: reader.path()?,
        })
    }
}
