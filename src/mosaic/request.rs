use super::{Coverage, MosaicReader};
use crate::archive::TileArchive;
use crate::error::MosaicResult;
use crate::geometry::Envelope;

pub struct ReadRequest<'a, A> {
    pub reader: &'a MosaicReader<A>,
    pub name: String,
    pub envelope: Option<Envelope>,
    pub dimensions: Option<(u32, u32)>,
}

impl<'a, A> ReadRequest<'a, A> {
    pub(super) fn new(reader: &'a MosaicReader<A>, name: String) -> Self {
        Self {
            reader,
            name,
            envelope: None,
            dimensions: None,
        }
    }

    /// Requested extent in the pyramid's reference system
    pub fn with_envelope(mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        self.envelope = Some(Envelope::from_corners(min_x, min_y, max_x, max_y));
        self
    }

    pub fn with_region(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }
}

impl<'a, A: TileArchive> ReadRequest<'a, A> {
    pub fn read(&self) -> MosaicResult<Coverage> {
        self.reader
            .read(&self.name, self.envelope.as_ref(), self.dimensions)
    }
}
