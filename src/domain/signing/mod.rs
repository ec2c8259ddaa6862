//! Request signing protocol: canonical form, monetary notation, envelope.

mod canonical;
mod envelope;
mod numeric;

pub use canonical::{canonicalize, to_canonical_string};
pub use envelope::{envelope_object, CanonicalPayload, SignedEnvelope, SigningError};
pub use numeric::{ensure_fractional_amounts, FRACTIONAL_AMOUNT_FIELDS};
