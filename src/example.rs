//! Pre-wired two-node bus used by the crate examples and doctests.
use crate::access::CsrAccess;
use crate::device::Cdctl;
use crate::node::Node;
use crate::wire::Wire;

/// Two nodes (addresses 0x01 and 0x02) on a shared wire, each driven
/// through its own [Cdctl] over direct register access.
pub struct ExamplePair {
    pub wire: Wire,
    pub left: Cdctl<CsrAccess>,
    pub right: Cdctl<CsrAccess>,
}

/// Builds the pair with default configuration.
pub fn example_pair() -> ExamplePair {
    let mut wire = Wire::new();

    let left = wire.attach(Node::new(0x01));
    let right = wire.attach(Node::new(0x02));

    ExamplePair {
        wire,
        left: Cdctl::new(CsrAccess::new(left)),
        right: Cdctl::new(CsrAccess::new(right)),
    }
}
