use coset::iana;

/// Implemented by anything that can sign a COSE structure and knows which
/// algorithm identifier belongs in its protected header.
pub trait SignatureAlgorithm {
    fn algorithm(&self) -> iana::Algorithm;
}
