/// Back-reference from a scene entity to the record it was built from.
///
/// Indices point into the collections owned by `NetworkScene`; they are only
/// valid until the next rebuild.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SceneTag {
    Globe,
    Element(usize),
    Link(usize),
    Cable(usize),
}
