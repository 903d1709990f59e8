use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct FrameInfo {
    name: String,
    pseudo_inertial: bool,
}

/// A reference frame. Cloning is cheap, and two handles are equal only if
/// they were cloned from the same original, so frames with the same name
/// created separately are still distinct.
#[derive(Clone)]
pub struct Frame(Arc<FrameInfo>);

impl Frame {
    pub fn new(name: impl Into<String>, pseudo_inertial: bool) -> Self {
        Frame(Arc::new(FrameInfo {
            name: name.into(),
            pseudo_inertial,
        }))
    }

    /// Convenience constructor for an inertial frame.
    pub fn inertial(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_pseudo_inertial(&self) -> bool {
        self.0.pseudo_inertial
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0.name)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
