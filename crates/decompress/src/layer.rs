use tower_layer::Layer;

use crate::round_tripper::Decompress;

/// A [`Layer`] wrapping a transport in [`Decompress`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecompressLayer;

impl DecompressLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<T> Layer<T> for DecompressLayer {
    type Service = Decompress<T>;

    fn layer(&self, inner: T) -> Self::Service {
        Decompress::wrap(inner)
    }
}
