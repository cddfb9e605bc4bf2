//! Enumerations with stable wire names.

/// An enumeration whose constants are written by name.
///
/// `all()` lists the constants in declaration order, which is also the order
/// used when an enumeration set is written as a comma list.
pub trait WireEnum: Copy + Ord + Send + Sync + 'static {
    fn all() -> &'static [Self];

    fn wire_name(self) -> &'static str;

    fn from_wire(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|constant| constant.wire_name() == name)
    }

    /// Wire names of every constant, in declaration order.
    fn wire_names() -> Vec<&'static str> {
        Self::all().iter().map(|constant| constant.wire_name()).collect()
    }
}
